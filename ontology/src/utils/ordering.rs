use rand::{Rng, seq::SliceRandom};

/// A permutation of `0..len`, mapping display positions to original indices.
///
/// Quizzes and objective questions may allow their items to be presented in
/// a different order than they are defined in. Answers and results are
/// always recorded against the *original* index; an [`Ordering`] translates
/// between the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ordering(Box<[usize]>);

impl Ordering {
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    #[must_use]
    pub fn shuffled(len: usize, rng: &mut impl Rng) -> Self {
        let mut v: Vec<_> = (0..len).collect();
        v.shuffle(rng);
        Self(v.into_boxed_slice())
    }

    /// Shuffles if `reorder` is set, otherwise returns the identity.
    #[inline]
    #[must_use]
    pub fn new(len: usize, reorder: bool, rng: &mut impl Rng) -> Self {
        if reorder {
            Self::shuffled(len, rng)
        } else {
            Self::identity(len)
        }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The original index shown at display position `position`.
    #[inline]
    #[must_use]
    pub fn original(&self, position: usize) -> Option<usize> {
        self.0.get(position).copied()
    }

    /// The display position of original index `index`.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<usize> {
        self.0.iter().position(|i| *i == index)
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

crate::utils::tests! {
    identity_maps_to_itself {
        let o = Ordering::identity(4);
        assert_eq!(o.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(o.position(2), Some(2));
        assert_eq!(o.original(4), None);
    };
    shuffled_is_a_permutation {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let o = Ordering::shuffled(10, &mut rng);
        let mut seen: Vec<_> = o.iter().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        for pos in 0..10 {
            let orig = o.original(pos).unwrap();
            assert_eq!(o.position(orig), Some(pos));
        }
    };
    no_reorder_keeps_definition_order {
        let mut rng = rand::rng();
        assert_eq!(Ordering::new(5, false, &mut rng), Ordering::identity(5));
    }
}
