use crate::{EvalError, Not};

/// Evaluation backend: decides whether a candidate passes.
///
/// `test` fails only on data errors, such as a field the candidate does not
/// have. Comparisons that merely do not apply to the data evaluate to
/// `false` instead.
pub trait Predicate<Item: ?Sized> {
    fn test(&self, candidate: &Item) -> Result<bool, EvalError>;

    /// Keep the candidates that pass, in their original order.
    ///
    /// The result borrows the input elements; nothing is copied or
    /// deduplicated. The first evaluation error aborts the whole pass.
    fn filter_list<'c, I>(&self, candidates: I) -> Result<Vec<&'c Item>, EvalError>
    where
        Self: Sized,
        I: IntoIterator<Item = &'c Item>,
        Item: 'c,
    {
        let mut total = 0_usize;
        let mut kept = Vec::new();

        for candidate in candidates {
            total += 1;
            if self.test(candidate)? {
                kept.push(candidate);
            }
        }

        tracing::debug!(total, kept = kept.len(), "filtered candidates");

        Ok(kept)
    }
}

impl<Item: ?Sized> Predicate<Item> for () {
    #[inline]
    fn test(&self, _: &Item) -> Result<bool, EvalError> {
        Ok(true)
    }
}

impl<P, Item> Predicate<Item> for Option<P>
where
    P: Predicate<Item>,
    Item: ?Sized,
{
    #[inline]
    fn test(&self, candidate: &Item) -> Result<bool, EvalError> {
        self.as_ref().map_or(Ok(true), |p| p.test(candidate))
    }
}

impl<T, Item> Predicate<Item> for &T
where
    T: Predicate<Item> + ?Sized,
    Item: ?Sized,
{
    #[inline]
    fn test(&self, candidate: &Item) -> Result<bool, EvalError> {
        T::test(self, candidate)
    }
}

impl<T, Item> Predicate<Item> for Box<T>
where
    T: Predicate<Item> + ?Sized,
    Item: ?Sized,
{
    #[inline]
    fn test(&self, candidate: &Item) -> Result<bool, EvalError> {
        T::test(self, candidate)
    }
}

pub trait PredicateExt<Item: ?Sized>: Predicate<Item> + Sized {
    fn invert(self) -> Not<Self>;
}

impl<T, Item> PredicateExt<Item> for T
where
    T: Predicate<Item>,
    Item: ?Sized,
{
    #[inline]
    fn invert(self) -> Not<Self> {
        Not::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Even;

    impl Predicate<u8> for Even {
        fn test(&self, candidate: &u8) -> Result<bool, EvalError> {
            Ok(candidate % 2 == 0)
        }
    }

    #[test]
    fn unit_and_none_accept_everything() {
        assert!(().test(&3_u8).unwrap());
        assert!(None::<Even>.test(&3).unwrap());
        assert!(!Some(Even).test(&3).unwrap());
    }

    #[test]
    fn invert_flips_the_outcome() {
        assert!(Even.invert().test(&3).unwrap());
        assert!(!(&Even).invert().test(&4).unwrap());
    }

    #[test]
    fn filter_list_borrows_matching_elements() {
        let values = [1_u8, 2, 3, 4, 4];
        let kept = Even.filter_list(&values).unwrap();

        assert_eq!(kept, vec![&2, &4, &4]);
        assert!(std::ptr::eq(kept[1], &values[3]));
        assert!(std::ptr::eq(kept[2], &values[4]));
    }

    #[test]
    fn filter_list_of_nothing_is_empty() {
        let values: [u8; 0] = [];

        assert!(Even.filter_list(&values).unwrap().is_empty());
    }
}
