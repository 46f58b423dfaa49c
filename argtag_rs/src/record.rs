//! Records: plain structs whose annotated fields become flags and
//! positional arguments.
//!
//! A record describes itself through an ordered table of
//! [`FieldDescriptor`]s and accepts writes through [`Record::set`]. The
//! [`record!`](crate::record!) macro generates both from an ordinary struct
//! definition:
//!
//! ```
//! argtag::record! {
//!     #[derive(Debug, Default)]
//!     pub struct Compare {
//!         #[arg("flag=v, verbose output")]
//!         pub verbose: bool,
//!         /// First file.
//!         #[arg]
//!         pub file1: String,
//!         #[arg]
//!         pub file2: String,
//!         // No #[arg]: invisible to the command line.
//!         pub scratch: Vec<String>,
//!     }
//! }
//!
//! impl argtag::Runnable for Compare {
//!     fn run(&mut self, _ctx: &()) -> anyhow::Result<()> {
//!         println!("{} vs {}", self.file1, self.file2);
//!         Ok(())
//!     }
//! }
//! ```

use std::any::Any;

use crate::error::ValueError;
use crate::value::{Kind, Value};

/// One row of a record's field table.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name as written in the struct.
    pub name: &'static str,
    /// Annotation tag; `None` hides the field from the command line.
    pub tag: Option<&'static str>,
    pub kind: Kind,
    /// Current value, used for flag defaults.
    pub value: Value,
}

/// A struct that exposes its fields to the command line.
pub trait Record: Any {
    /// Field table in declaration order.
    fn fields(&self) -> Vec<FieldDescriptor>;

    /// Write a coerced value into the named field.
    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError>;

    fn as_any(&self) -> &dyn Any;
}

/// A record with behaviour: the leaf of a command tree, or a group that
/// also does something when invoked without a sub-command.
pub trait Runnable<C = ()>: Record {
    /// Called after this command's flags are parsed, before a sub-command
    /// is chosen or positional arguments are bound.
    fn before(&mut self, _ctx: &C) -> anyhow::Result<()> {
        Ok(())
    }

    fn run(&mut self, ctx: &C) -> anyhow::Result<()>;
}

/// A record without behaviour of its own. Its flags are parsed, and
/// `before` runs, on the way to one of its sub-commands.
pub trait Group<C = ()>: Record {
    fn before(&mut self, _ctx: &C) -> anyhow::Result<()> {
        Ok(())
    }
}

/// What a command node does when it is reached.
pub enum Behavior<C: 'static = ()> {
    /// Pure group with no record.
    None,
    Group(Box<dyn Group<C>>),
    Runnable(Box<dyn Runnable<C>>),
}

impl<C: 'static> Behavior<C> {
    pub fn runnable(record: impl Runnable<C> + 'static) -> Self {
        Behavior::Runnable(Box::new(record))
    }

    pub fn group(record: impl Group<C> + 'static) -> Self {
        Behavior::Group(Box::new(record))
    }

    pub fn is_runnable(&self) -> bool {
        matches!(self, Behavior::Runnable(_))
    }

    pub(crate) fn fields(&self) -> Vec<FieldDescriptor> {
        match self {
            Behavior::None => Vec::new(),
            Behavior::Group(g) => g.fields(),
            Behavior::Runnable(r) => r.fields(),
        }
    }

    pub(crate) fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match self {
            Behavior::None => Err(ValueError::UnknownField(field.to_string())),
            Behavior::Group(g) => g.set(field, value),
            Behavior::Runnable(r) => r.set(field, value),
        }
    }

    pub(crate) fn before(&mut self, ctx: &C) -> anyhow::Result<()> {
        match self {
            Behavior::None => Ok(()),
            Behavior::Group(g) => g.before(ctx),
            Behavior::Runnable(r) => r.before(ctx),
        }
    }

    pub(crate) fn as_any(&self) -> Option<&dyn Any> {
        match self {
            Behavior::None => None,
            Behavior::Group(g) => Some(g.as_any()),
            Behavior::Runnable(r) => Some(r.as_any()),
        }
    }
}

/// Declare a struct and implement [`Record`] for it.
///
/// Fields take optional doc comments followed by an optional `#[arg]` or
/// `#[arg("<tag>")]`. Fields without `#[arg]` are not visible on the
/// command line. Every field type must implement
/// [`FieldType`](crate::FieldType).
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $(#[arg $(($tag:literal))?])?
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn fields(&self) -> ::std::vec::Vec<$crate::FieldDescriptor> {
                ::std::vec![
                    $(
                        $crate::FieldDescriptor {
                            name: ::core::stringify!($field),
                            tag: $crate::__field_tag!($(arg $($tag)?)?),
                            kind: <$ty as $crate::FieldType>::kind(),
                            value: $crate::FieldType::to_value(&self.$field),
                        },
                    )*
                ]
            }

            #[allow(unused_variables)]
            fn set(
                &mut self,
                field: &str,
                value: $crate::Value,
            ) -> ::core::result::Result<(), $crate::ValueError> {
                match field {
                    $(
                        ::core::stringify!($field) => {
                            self.$field = <$ty as $crate::FieldType>::from_value(value)?;
                            ::core::result::Result::Ok(())
                        }
                    )*
                    other => ::core::result::Result::Err(
                        $crate::ValueError::UnknownField(::std::string::ToString::to_string(other)),
                    ),
                }
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_tag {
    () => {
        ::core::option::Option::None
    };
    (arg) => {
        ::core::option::Option::Some("")
    };
    (arg $tag:literal) => {
        ::core::option::Option::Some($tag)
    };
}
