//! Message categories and signal masks.
//!
//! Each category owns one bit in the transport's signal word. The dispatch
//! loop waits on a [`CategoryMask`] and services ready categories in the
//! fixed order of [`Category::PRIORITY`].

/// One of the fixed message groups the dispatch loop routes independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Service initialization (reference-counted).
    Init,
    /// Message authentication codes (streaming).
    Mac,
    /// Unkeyed hashing (streaming, with clone support).
    Hash,
    /// Symmetric cipher (streaming).
    Cipher,
    /// One-shot asymmetric sign/verify/encrypt/decrypt.
    Asymmetric,
    /// One-shot authenticated encryption with associated data.
    Aead,
    /// Key lifecycle management.
    KeyManagement,
    /// Random byte generation.
    Rng,
    /// Service teardown (balances Init).
    Free,
    /// Key derivation / agreement generators (streaming).
    Generator,
    /// Entropy seed injection.
    EntropyInject,
}

impl Category {
    /// Intra-cycle service order. When several categories are ready in one
    /// wait cycle, they are drained one message each in exactly this order.
    pub const PRIORITY: [Category; 11] = [
        Category::Init,
        Category::Mac,
        Category::Hash,
        Category::Cipher,
        Category::Asymmetric,
        Category::Aead,
        Category::KeyManagement,
        Category::Rng,
        Category::Free,
        Category::Generator,
        Category::EntropyInject,
    ];

    /// Signal bit owned by this category.
    pub fn signal(self) -> CategoryMask {
        let bit = match self {
            Self::Init => 0,
            Self::Mac => 1,
            Self::Hash => 2,
            Self::Cipher => 3,
            Self::Asymmetric => 4,
            Self::Aead => 5,
            Self::KeyManagement => 6,
            Self::Rng => 7,
            Self::Free => 8,
            Self::Generator => 9,
            Self::EntropyInject => 10,
        };
        CategoryMask(1 << bit)
    }
}

/// Bitset of category signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryMask(pub u32);

impl CategoryMask {
    /// The empty mask.
    pub const NONE: CategoryMask = CategoryMask(0);

    /// Mask covering every category.
    pub fn all() -> Self {
        Category::PRIORITY.iter().fold(Self::NONE, |mask, c| mask.union(c.signal()))
    }

    /// True iff this mask contains the given category's signal.
    pub fn contains(self, category: Category) -> bool {
        self.0 & category.signal().0 != 0
    }

    /// Union of two masks.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True iff no signal is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_are_distinct_bits() {
        let mut seen = 0u32;
        for category in Category::PRIORITY {
            let bit = category.signal().0;
            assert_eq!(bit.count_ones(), 1);
            assert_eq!(seen & bit, 0, "signal bit reused");
            seen |= bit;
        }
    }

    #[test]
    fn all_covers_every_category() {
        let all = CategoryMask::all();
        for category in Category::PRIORITY {
            assert!(all.contains(category));
        }
    }

    #[test]
    fn priority_starts_with_init_and_ends_with_entropy() {
        assert_eq!(Category::PRIORITY[0], Category::Init);
        assert_eq!(Category::PRIORITY[10], Category::EntropyInject);
    }

    #[test]
    fn empty_mask_contains_nothing() {
        assert!(CategoryMask::NONE.is_empty());
        assert!(!CategoryMask::NONE.contains(Category::Hash));
    }
}
