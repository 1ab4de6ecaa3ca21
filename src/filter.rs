//! Category/mask/group collision filtering attached to fixtures.

/// Category/mask/group collision filter attached to a fixture.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub category_bits: u64,
    pub mask_bits: u64,
    pub group_index: i32,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            category_bits: 1,
            mask_bits: u64::MAX,
            group_index: 0,
        }
    }
}

/// Default collision rule: nonzero-equal group indices force a decision
/// (collide if positive, reject if negative); otherwise fall back to the
/// category/mask bitmasks.
pub fn should_collide(a: &Filter, b: &Filter) -> bool {
    if a.group_index == b.group_index && a.group_index != 0 {
        return a.group_index > 0;
    }
    (a.category_bits & b.mask_bits) != 0 && (b.category_bits & a.mask_bits) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_collides_with_itself() {
        let f = Filter::default();
        assert!(should_collide(&f, &f));
    }

    #[test]
    fn positive_group_forces_collision() {
        let a = Filter {
            category_bits: 1,
            mask_bits: 0,
            group_index: 5,
        };
        let b = Filter {
            category_bits: 2,
            mask_bits: 0,
            group_index: 5,
        };
        assert!(should_collide(&a, &b));
    }

    #[test]
    fn negative_group_forces_rejection() {
        let a = Filter {
            category_bits: 1,
            mask_bits: u64::MAX,
            group_index: -3,
        };
        let b = Filter {
            category_bits: 1,
            mask_bits: u64::MAX,
            group_index: -3,
        };
        assert!(!should_collide(&a, &b));
    }

    #[test]
    fn mask_category_mismatch_rejects() {
        let a = Filter {
            category_bits: 0b0001,
            mask_bits: 0b0010,
            group_index: 0,
        };
        let b = Filter {
            category_bits: 0b0001,
            mask_bits: 0b0010,
            group_index: 0,
        };
        assert!(!should_collide(&a, &b));
    }
}
