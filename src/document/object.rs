//! Embedded objects: externally rendered content placed inline with text

use crate::document::Style;
use crate::layout::LayoutSignal;
use crate::{Padding, Rect, Size};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Error type returned by client callbacks
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Context handed to an embedded object when it is measured or hosted
pub struct EmbeddedObjectSite<'a> {
    /// Style of the paragraph containing the object
    pub paragraph_style: &'a Style,
    /// Style attached to the object run itself
    pub inline_style: &'a Style,
    /// Character index of the object's placeholder
    pub char_index: usize,
    /// Reading direction of the object run
    pub right_to_left: bool,
    /// Handle for requesting relayout from inside a callback
    pub signal: &'a LayoutSignal,
}

/// Size, margins and baseline of an embedded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmbeddedObjectMeasurements {
    pub size: Size,
    pub margin: Padding,
    /// Distance from the bottom of the object to its baseline
    pub descent: i32,
}

impl EmbeddedObjectMeasurements {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Content that occupies one character position but is drawn by the host.
///
/// Measurement failures (an `Err` or a panic) are treated as a zero-size
/// object; they never abort layout.
pub trait EmbeddedObject {
    fn measure(
        &self,
        site: &EmbeddedObjectSite<'_>,
    ) -> Result<EmbeddedObjectMeasurements, BoxError>;

    /// Create a per-layout client for hosting a live widget at `site`.
    /// Objects that are only painted return `None`.
    fn create_client(
        &self,
        _site: &EmbeddedObjectSite<'_>,
    ) -> Option<Box<dyn EmbeddedObjectClient>> {
        None
    }
}

/// Per-layout host of a live embedded object
pub trait EmbeddedObjectClient {
    /// Position the object at `bounds`, relative to the layout origin
    fn show(&mut self, bounds: Rect, right_to_left: bool);

    fn hide(&mut self);
}

/// Shared handle to an embedded object; interned by identity, not by value
#[derive(Clone)]
pub struct ObjectRef(Rc<dyn EmbeddedObject>);

impl ObjectRef {
    pub fn new(object: impl EmbeddedObject + 'static) -> Self {
        ObjectRef(Rc::new(object))
    }

    pub fn from_rc(object: Rc<dyn EmbeddedObject>) -> Self {
        ObjectRef(object)
    }

    /// Address of the shared allocation
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.identity() == other.identity()
    }
}

impl Deref for ObjectRef {
    type Target = dyn EmbeddedObject;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:#x})", self.identity())
    }
}

/// Fixed-size object, mostly useful for images and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedSizeObject {
    pub measurements: EmbeddedObjectMeasurements,
}

impl FixedSizeObject {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            measurements: EmbeddedObjectMeasurements::new(Size::new(width, height)),
        }
    }
}

impl EmbeddedObject for FixedSizeObject {
    fn measure(
        &self,
        _site: &EmbeddedObjectSite<'_>,
    ) -> Result<EmbeddedObjectMeasurements, BoxError> {
        Ok(self.measurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_follows_allocation() {
        let a = ObjectRef::new(FixedSizeObject::new(10, 10));
        let b = ObjectRef::new(FixedSizeObject::new(10, 10));
        let a2 = a.clone();
        assert!(a.ptr_eq(&a2));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_fixed_size_measure() {
        let object = FixedSizeObject::new(32, 16);
        let style = Style::default();
        let signal = LayoutSignal::new();
        let site = EmbeddedObjectSite {
            paragraph_style: &style,
            inline_style: &style,
            char_index: 0,
            right_to_left: false,
            signal: &signal,
        };
        let measured = object.measure(&site).unwrap();
        assert_eq!(measured.size, Size::new(32, 16));
        assert_eq!(measured.descent, 0);
    }
}
