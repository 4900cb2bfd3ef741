use quickcheck::{Arbitrary, Gen};

/// An enum for the various kinds of "things" to do to
/// a sorted set in a quicktest.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op<T> {
    /// Add the value to the set
    Add(T),
    /// Remove the value from the set
    Remove(T),
    /// Look the value up
    Contains(T),
    /// Compare the smallest and largest values
    Extremes,
    /// Empty the set
    Clear,
}

impl<T> Arbitrary for Op<T>
where
    T: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation. Adds are the most common so trees
    /// actually grow, clearing is rare so they get a chance to.
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 20 {
            0..=9 => Op::Add(T::arbitrary(g)),
            10..=15 => Op::Remove(T::arbitrary(g)),
            16 | 17 => Op::Contains(T::arbitrary(g)),
            18 => Op::Extremes,
            19 => Op::Clear,
            _ => unreachable!(),
        }
    }
}
