use std::{
    fmt,
    iter,
    marker::PhantomData,
    ops::{BitAnd, BitOr},
};

use super::{EvalError, Predicate};

/// A recursive tree of Boolean filter nodes.
///
/// Leaves hold the atomic conditions of one backend; the other variants
/// combine them. The tree is immutable once built: every combinator takes
/// its operands by value and returns a new node around them, so the same
/// subtree can be cloned into several unrelated trees without either one
/// observing the other.
///
/// # Variants
///
/// - `All`
///   Conjunction of the child nodes. Evaluated left to right, stopping at
///   the first child that fails. An empty `All` is true.
///
/// - `Any`
///   Disjunction of the child nodes. Evaluated left to right, stopping at
///   the first child that passes. An empty `Any` is false.
///
/// - `Not`
///   Negation of exactly one child.
///
/// - `Leaf`
///   A single condition of type `T`.
///
/// Rendering with [`Display`](fmt::Display) produces directory filter
/// grammar in prefix form, e.g. `(&(cn=a)(!(cn=b)))`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterTree<T> {
    All(Vec<Self>),
    Any(Vec<Self>),
    Not(Box<Self>),
    Leaf(T),
}

impl<T> FilterTree<T> {
    pub const TRUE: FilterTree<T> = Self::All(vec![]);
    pub const FALSE: FilterTree<T> = Self::Any(vec![]);

    #[doc(alias = "conjunction")]
    #[inline]
    pub fn all(nodes: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::All(nodes.into_iter().map(Into::into).collect())
    }

    #[doc(alias = "disjunction")]
    #[inline]
    pub fn any(nodes: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::Any(nodes.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn negation(node: impl Into<Self>) -> Self {
        Self::Not(Box::new(node.into()))
    }

    #[inline]
    pub fn leaf(value: T) -> Self {
        Self::Leaf(value)
    }

    /// Conjunction of `self` followed by `more`, in that order.
    ///
    /// Same result as `FilterTree::all([self, more..])`; nested
    /// conjunctions are kept as written, never flattened.
    #[inline]
    #[must_use]
    pub fn and(self, more: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::All(iter::once(self).chain(more.into_iter().map(Into::into)).collect())
    }

    /// Disjunction of `self` followed by `more`, in that order.
    #[inline]
    #[must_use]
    pub fn or(self, more: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::Any(iter::once(self).chain(more.into_iter().map(Into::into)).collect())
    }

    #[allow(clippy::should_implement_trait)]
    #[inline]
    #[must_use]
    pub fn not(self) -> Self {
        Self::negation(self)
    }

    /// Collapse the tree bottom-up.
    ///
    /// `transform` maps each leaf, `combine` receives the already-folded
    /// children of an `All`/`Any` node in order, and `invert` wraps the
    /// folded child of a `Not`.
    #[inline]
    pub fn fold<C, I, F, R>(&self, combine: C, invert: I, mut transform: F) -> R
    where
        for<'i> C: Fn(Box<dyn Iterator<Item = R> + 'i>, CombinationOperatorKind) -> R,
        I: Fn(R) -> R,
        for<'l> F: FnMut(&'l T) -> R,
    {
        self.fold_with(&combine, &invert, &mut transform)
    }

    // Recurses with the same closure types so instantiation stays finite.
    fn fold_with<C, I, F, R>(&self, combine: &C, invert: &I, transform: &mut F) -> R
    where
        for<'i> C: Fn(Box<dyn Iterator<Item = R> + 'i>, CombinationOperatorKind) -> R,
        I: Fn(R) -> R,
        for<'l> F: FnMut(&'l T) -> R,
    {
        match self {
            Self::All(nodes) | Self::Any(nodes) => {
                let op = if matches!(self, Self::All(_)) {
                    CombinationOperatorKind::All
                } else {
                    CombinationOperatorKind::Any
                };
                let transformed_nodes: Box<dyn Iterator<Item = R> + '_> = Box::new(
                    nodes
                        .iter()
                        .map(|node| node.fold_with(combine, invert, &mut *transform)),
                );

                combine(transformed_nodes, op)
            }
            Self::Not(node) => {
                let transformed_node = node.fold_with(combine, invert, transform);

                invert(transformed_node)
            }
            Self::Leaf(leaf) => transform(leaf),
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.fold(
            |children, _| children.max().map_or(0, |deepest| deepest + 1),
            |child| child + 1,
            |_| 0,
        )
    }
}

impl<F, FN, Op, T> From<Combination<F, FN, Op>> for FilterTree<T>
where
    F: Into<FilterTree<T>>,
    FN: IntoIterator<Item = F>,
    Op: Into<CombinationOperatorKind>,
{
    #[inline]
    fn from(value: Combination<F, FN, Op>) -> Self {
        let Combination { nodes, op, _marker } = value;
        let nodes: Vec<_> = nodes.into_iter().map(Into::into).collect();

        let op: CombinationOperatorKind = op.into();

        match op {
            CombinationOperatorKind::All => Self::All(nodes),
            CombinationOperatorKind::Any => Self::Any(nodes),
        }
    }
}

impl<T> From<Not<Self>> for FilterTree<T> {
    #[inline]
    fn from(value: Not<Self>) -> Self {
        Self::Not(Box::new(value.into_inner()))
    }
}

impl<T> std::ops::Not for FilterTree<T> {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self::negation(self)
    }
}

impl<T> BitAnd for FilterTree<T> {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self::All(vec![self, rhs])
    }
}

impl<T> BitOr for FilterTree<T> {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Any(vec![self, rhs])
    }
}

impl<T> fmt::Display for FilterTree<T>
where
    T: fmt::Display,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterTree::All(nodes) => write!(f, "{}", Combination::<_, _, All>::all(nodes)),
            FilterTree::Any(nodes) => write!(f, "{}", Combination::<_, _, Any>::any(nodes)),
            FilterTree::Not(node) => write!(f, "{}", Not::new(node)),
            FilterTree::Leaf(term) => term.fmt(f),
        }
    }
}

impl<T, Item> Predicate<Item> for FilterTree<T>
where
    T: Predicate<Item>,
    Item: ?Sized,
{
    #[inline]
    fn test(&self, candidate: &Item) -> Result<bool, EvalError> {
        match self {
            Self::All(nodes) => Combination::all(nodes).test(candidate),
            Self::Any(nodes) => Combination::any(nodes).test(candidate),
            Self::Not(node) => Not::new(node.as_ref()).test(candidate),
            Self::Leaf(term) => term.test(candidate),
        }
    }
}

/// A borrowed or owned run of sibling nodes joined by one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Combination<T, N = Vec<T>, Op = CombinationOperatorKind> {
    pub nodes: N,
    pub op: Op,
    _marker: PhantomData<T>,
}

impl<T, N, Op> Combination<T, N, Op> {
    #[inline]
    pub fn new(nodes: N, op: Op) -> Self {
        Self {
            nodes,
            op,
            _marker: PhantomData,
        }
    }
}

impl<T, N> Combination<T, N, All> {
    #[inline]
    pub fn all(nodes: N) -> Self {
        Self::new(nodes, All)
    }
}

impl<T, N> Combination<T, N, Any> {
    #[inline]
    pub fn any(nodes: N) -> Self {
        Self::new(nodes, Any)
    }
}

impl<T, N, Op, Item> Predicate<Item> for Combination<T, N, Op>
where
    T: Predicate<Item>,
    N: AsRef<[T]>,
    Op: CombinationOperator,
    Item: ?Sized,
{
    #[inline]
    fn test(&self, candidate: &Item) -> Result<bool, EvalError> {
        self.op
            .combine(self.nodes.as_ref().iter().map(|node| node.test(candidate)))
    }
}

impl<T, N, Op> fmt::Display for Combination<T, N, Op>
where
    T: fmt::Display,
    N: AsRef<[T]>,
    for<'o> &'o Op: Into<CombinationOperatorKind>,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op: CombinationOperatorKind = (&self.op).into();

        write!(f, "({op}")?;
        for node in self.nodes.as_ref() {
            node.fmt(f)?;
        }
        f.write_str(")")
    }
}

/// Folds child outcomes into the outcome of their parent.
///
/// Implementations must pull from `outcomes` lazily so that children past
/// the deciding one are never evaluated.
pub trait CombinationOperator {
    fn combine<I>(&self, outcomes: I) -> Result<bool, EvalError>
    where
        I: Iterator<Item = Result<bool, EvalError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("&")]
pub struct All;

impl CombinationOperator for All {
    #[inline]
    fn combine<I>(&self, outcomes: I) -> Result<bool, EvalError>
    where
        I: Iterator<Item = Result<bool, EvalError>>,
    {
        for outcome in outcomes {
            if !outcome? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

impl From<All> for CombinationOperatorKind {
    #[inline]
    fn from(_: All) -> Self {
        Self::All
    }
}

impl From<&All> for CombinationOperatorKind {
    #[inline]
    fn from(_: &All) -> Self {
        Self::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("|")]
pub struct Any;

impl CombinationOperator for Any {
    #[inline]
    fn combine<I>(&self, outcomes: I) -> Result<bool, EvalError>
    where
        I: Iterator<Item = Result<bool, EvalError>>,
    {
        for outcome in outcomes {
            if outcome? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl From<Any> for CombinationOperatorKind {
    #[inline]
    fn from(_: Any) -> Self {
        Self::Any
    }
}

impl From<&Any> for CombinationOperatorKind {
    #[inline]
    fn from(_: &Any) -> Self {
        Self::Any
    }
}

/// Runtime tag for the two n-ary operators; displays as its filter
/// grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CombinationOperatorKind {
    #[display("&")]
    All,
    #[display("|")]
    Any,
}

impl From<&CombinationOperatorKind> for CombinationOperatorKind {
    #[inline]
    fn from(value: &CombinationOperatorKind) -> Self {
        *value
    }
}

impl CombinationOperator for CombinationOperatorKind {
    #[inline]
    fn combine<I>(&self, outcomes: I) -> Result<bool, EvalError>
    where
        I: Iterator<Item = Result<bool, EvalError>>,
    {
        match self {
            CombinationOperatorKind::All => All.combine(outcomes),
            CombinationOperatorKind::Any => Any.combine(outcomes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Not<T>(T);

impl<T> Not<T> {
    #[inline]
    pub fn new(term: T) -> Self {
        Self(term)
    }

    #[inline]
    pub fn inner(&self) -> &T {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<F> fmt::Display for Not<F>
where
    F: fmt::Display,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(node) = self;
        write!(f, "(!{node})")
    }
}

impl<T, Item> Predicate<Item> for Not<T>
where
    T: Predicate<Item>,
    Item: ?Sized,
{
    #[inline]
    fn test(&self, candidate: &Item) -> Result<bool, EvalError> {
        Ok(!self.inner().test(candidate)?)
    }
}
