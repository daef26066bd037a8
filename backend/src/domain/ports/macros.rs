//! Declarative error enums for the outbound ports.
//!
//! Each variant carries a `thiserror` message and gets a snake_case
//! constructor. Field-carrying variants take `impl Into<_>` per field, so
//! adapters can pass `&str`, `String`, or a `Display` rendering directly.

macro_rules! define_port_error {
    (
        $(#[$enum_attr:meta])*
        pub enum $name:ident {
            $(
                $(#[$attr:meta])*
                $variant:ident $( { $( $field:ident : $ty:ty ),+ $(,)? } )? => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_attr])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$attr])*
                #[error($message)]
                $variant $( { $( $field: $ty ),+ } )?,
            )+
        }

        ::paste::paste! {
            #[allow(dead_code)]
            impl $name {
                $(
                    pub fn [<$variant:snake>]( $( $( $field: impl Into<$ty> ),+ )? ) -> Self {
                        Self::$variant $( { $( $field: $field.into() ),+ } )?
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;
