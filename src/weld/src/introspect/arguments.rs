use std::any;
use std::vec::IntoIter;

use crate::container::injector::ResolutionError;
use crate::container::Managed;
use crate::parameter::{DynProvider, Provider};

/// A resolved slot value.
pub(crate) enum Argument {
    Present(Box<dyn Managed>),
    Absent,
    Deferred(DynProvider),
}

/// The resolved slot values of one member invocation, consumed in
/// declaration order.
pub struct Arguments {
    member: &'static str,
    values: IntoIter<Argument>,
    index: usize,
}

impl Arguments {
    pub(crate) fn new(member: &'static str, values: Vec<Argument>) -> Self {
        Self {
            member,
            values: values.into_iter(),
            index: 0,
        }
    }

    /// Arguments of a member without slots.
    pub fn empty(member: &'static str) -> Self {
        Self::new(member, Vec::new())
    }

    /// Arguments made of present values only.
    pub fn from_values(member: &'static str, values: Vec<Box<dyn Managed>>) -> Self {
        Self::new(member, values.into_iter().map(Argument::Present).collect())
    }

    pub fn member(&self) -> &'static str {
        self.member
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Takes the next value, which must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ArgumentMismatch`] if the next slot is not a
    /// present `T`.
    pub fn take<T: Managed>(&mut self) -> Result<T, ResolutionError> {
        match self.next::<T>()? {
            (index, Argument::Present(object)) => self.downcast(index, object),
            (index, _) => Err(self.mismatch::<T>(index)),
        }
    }

    /// Takes the next value of a slot that may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ArgumentMismatch`] if the next slot is
    /// neither absent nor a present `T`.
    pub fn take_nullable<T: Managed>(&mut self) -> Result<Option<T>, ResolutionError> {
        match self.next::<T>()? {
            (index, Argument::Present(object)) => self.downcast(index, object).map(Some),
            (_, Argument::Absent) => Ok(None),
            (index, Argument::Deferred(_)) => Err(self.mismatch::<T>(index)),
        }
    }

    /// Takes the next value as a deferred [`Provider`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ArgumentMismatch`] if the next slot is not
    /// a provider of `T`.
    pub fn take_provider<T: Managed>(&mut self) -> Result<Provider<T>, ResolutionError> {
        match self.next::<T>()? {
            (_, Argument::Deferred(provider)) if provider.expected().is::<T>() => {
                Ok(Provider::new(provider))
            }
            (index, _) => Err(self.mismatch::<Provider<T>>(index)),
        }
    }

    fn next<T>(&mut self) -> Result<(usize, Argument), ResolutionError> {
        let index = self.index;
        let argument = self
            .values
            .next()
            .ok_or_else(|| self.mismatch::<T>(index))?;
        self.index += 1;
        Ok((index, argument))
    }

    fn downcast<T: Managed>(
        &self,
        index: usize,
        object: Box<dyn Managed>,
    ) -> Result<T, ResolutionError> {
        object
            .downcast::<T>()
            .map(|object| *object)
            .map_err(|_| self.mismatch::<T>(index))
    }

    fn mismatch<T>(&self, index: usize) -> ResolutionError {
        ResolutionError::ArgumentMismatch {
            member: self.member,
            index,
            expected: any::type_name::<T>(),
        }
    }
}
