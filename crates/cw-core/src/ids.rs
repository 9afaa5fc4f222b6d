use core::fmt;
use core::num::NonZeroU32;

/// Handle into one of the graph's arenas (components, ports, bindings).
///
/// Stored as `slot + 1` so `Option<Id>` costs nothing extra.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Positions past `u32::MAX - 1` saturate; arenas never grow that large.
    pub fn from_usize(slot: usize) -> Self {
        Self::from_index(u32::try_from(slot).unwrap_or(u32::MAX - 1))
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Arena position for `Vec` indexing.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.index(), f)
    }
}

pub type CompId = Id;
pub type PortId = Id;
pub type BindingId = Id;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slots_survive_conversion() {
        for slot in [0_usize, 1, 7, 4096] {
            assert_eq!(Id::from_usize(slot).slot(), slot);
        }
    }

    #[test]
    fn optional_id_has_no_tag() {
        assert_eq!(
            core::mem::size_of::<Option<CompId>>(),
            core::mem::size_of::<u32>()
        );
    }

    #[test]
    fn formatting() {
        assert!(Id::from_index(3) < Id::from_index(7));
        assert_eq!(Id::from_usize(12).to_string(), "12");
        assert_eq!(format!("{:?}", Id::from_index(5)), "#5");
    }

    proptest! {
        #[test]
        fn usize_and_u32_constructors_agree(i in 0_u32..1_000_000) {
            prop_assert_eq!(Id::from_usize(i as usize), Id::from_index(i));
            prop_assert_eq!(Id::from_index(i).index(), i);
        }
    }
}
