//! Application error handlers
//!
//! Handlers are registered per concrete error type. When a command fails,
//! the error and its `source()` chain are walked from the outside in and the
//! first cause with a registered handler decides the outcome.

use std::any::TypeId;
use std::error::Error as StdError;

type Handler = Box<dyn Fn(&(dyn StdError + 'static)) -> Option<Option<i32>>>;

/// Error type to handler table
#[derive(Default)]
pub struct ErrorHandlers {
    handlers: Vec<(TypeId, Handler)>,
}

impl ErrorHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for errors of type `E`, replacing an earlier one.
    /// A returned code becomes the exit code; `None` lets the program finish
    /// normally.
    pub fn register<E, F>(&mut self, handler: F)
    where
        E: StdError + 'static,
        F: Fn(&E) -> Option<i32> + 'static,
    {
        let id = TypeId::of::<E>();
        let handler: Handler = Box::new(move |err: &(dyn StdError + 'static)| {
            err.downcast_ref::<E>().map(&handler)
        });
        match self.handlers.iter_mut().find(|(ty, _)| *ty == id) {
            Some(entry) => entry.1 = handler,
            None => self.handlers.push((id, handler)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the closest matching handler. `None` if nothing matched.
    pub fn handle(&self, err: &anyhow::Error) -> Option<Option<i32>> {
        err.chain().find_map(|cause| {
            self.handlers
                .iter()
                .find_map(|(_, handler)| handler(cause))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::cell::Cell;
    use std::rc::Rc;
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("custom")]
    struct CustomError;

    #[derive(Error, Debug)]
    #[error("wrapped")]
    struct WrappingError(#[source] CustomError);

    #[derive(Error, Debug)]
    #[error("other")]
    struct OtherError;

    #[test]
    fn test_handler_returns_code() {
        let mut handlers = ErrorHandlers::new();
        handlers.register(|_: &CustomError| Some(16));

        let err = anyhow::Error::new(CustomError);
        assert_eq!(handlers.handle(&err), Some(Some(16)));

        let err = anyhow::Error::new(OtherError);
        assert_eq!(handlers.handle(&err), None);
    }

    #[test]
    fn test_handler_without_code() {
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        let mut handlers = ErrorHandlers::new();
        handlers.register(move |_: &CustomError| {
            flag.set(true);
            None
        });

        assert_eq!(handlers.handle(&anyhow::Error::new(CustomError)), Some(None));
        assert!(called.get());
    }

    #[test]
    fn test_walks_source_chain() {
        let mut handlers = ErrorHandlers::new();
        handlers.register(|_: &CustomError| Some(1));

        let err = anyhow::Error::new(WrappingError(CustomError));
        assert_eq!(handlers.handle(&err), Some(Some(1)));

        let err = Err::<(), _>(CustomError).context("while running").unwrap_err();
        assert_eq!(handlers.handle(&err), Some(Some(1)));
    }

    #[test]
    fn test_closest_match_wins() {
        let mut handlers = ErrorHandlers::new();
        handlers.register(|_: &CustomError| Some(1));
        handlers.register(|_: &WrappingError| Some(2));

        let err = anyhow::Error::new(WrappingError(CustomError));
        assert_eq!(handlers.handle(&err), Some(Some(2)));
    }

    #[test]
    fn test_reregister_replaces() {
        let mut handlers = ErrorHandlers::new();
        handlers.register(|_: &CustomError| Some(1));
        handlers.register(|_: &CustomError| Some(3));
        assert_eq!(handlers.handle(&anyhow::Error::new(CustomError)), Some(Some(3)));
    }
}
