use std::any::Any;

/// Lets a trait object which extends [`AsAny`] be viewed as [`Any`].
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Recovers the concrete type behind a boxed [`AsAny`] trait object.
pub trait Downcast: Sized {
    fn is<T: Any>(&self) -> bool;

    /// Returns the box itself if it doesn't hold a `T`.
    fn downcast<T: Any>(self) -> Result<Box<T>, Self>;
}

impl<S> Downcast for Box<S>
where
    S: AsAny + ?Sized,
{
    #[inline]
    fn is<T: Any>(&self) -> bool {
        (**self).as_any().is::<T>()
    }

    fn downcast<T: Any>(self) -> Result<Box<T>, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(object) => Ok(object),
            Err(_) => unreachable!("the box was checked to hold a `T`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::container::SharedManaged;

    use super::*;

    #[test]
    fn downcast_succeeds_when_box_holds_the_shared_instance() {
        let object: Box<dyn SharedManaged> = Box::new(Arc::new(42i32));

        assert!(object.is::<Arc<i32>>());
        assert!(!object.is::<i32>());

        let object = object.downcast::<Arc<i32>>().ok().map(|object| **object);
        assert_eq!(object, Some(42));
    }

    #[test]
    fn downcast_returns_the_box_when_type_differs() {
        let object: Box<dyn SharedManaged> = Box::new(Arc::new("queue"));
        match object.downcast::<Arc<i32>>() {
            Ok(_) => panic!("`Arc<&str>` should not downcast to `Arc<i32>`"),
            Err(object) => assert!(object.is::<Arc<&str>>()),
        }
    }
}
