//! Walking an error's `source()` chain.

use std::error::Error;

/// Iterator over an error and every error it wraps, outermost first.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Chain<'a> {
    /// Start a walk at `head`.
    pub fn new(head: &'a (dyn Error + 'static)) -> Self {
        Self { next: Some(head) }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Check whether any link of `err`'s chain satisfies `pred`.
pub fn any_link<F>(err: &(dyn Error + 'static), pred: F) -> bool
where
    F: FnMut(&(dyn Error + 'static)) -> bool,
{
    Chain::new(err).any(pred)
}
