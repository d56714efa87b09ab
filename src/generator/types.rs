//! Type mapping from IDL types to Rust types

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

use crate::msg::{Arity, Primitive, ResolvedType, Type};

/// Maps IDL types to Rust type tokens
///
/// Fixed arrays become `[T; N]`; bounded and unbounded arrays both become
/// `Vec<T>` with the bound surfaced separately via [`TypeMapper::bound_note`]
/// so it ends up in documentation instead of being silently dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper;

impl TypeMapper {
    /// Create a new type mapper
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Map a full field type (base + arity) to Rust type tokens
    #[must_use]
    pub fn map_type(&self, ty: &Type, current_package: &str) -> TokenStream {
        let base = self.map_base(&ty.base, current_package);
        match ty.arity {
            Arity::Scalar => base,
            Arity::Fixed(n) => {
                let len = Literal::usize_unsuffixed(n as usize);
                quote! { [#base; #len] }
            }
            Arity::Bounded(_) | Arity::Unbounded => quote! { ::std::vec::Vec<#base> },
        }
    }

    /// Map an element type to Rust type tokens.
    ///
    /// Composite types in the current package are referenced through
    /// `crate::` (the build driver's crate root re-exports every unit);
    /// cross-package types through their compiled module, `::package::Name`.
    #[must_use]
    pub fn map_base(&self, base: &ResolvedType, current_package: &str) -> TokenStream {
        match base {
            ResolvedType::Primitive(p) => self.map_primitive(*p),
            ResolvedType::Composite { package, name } => {
                let name = format_ident!("{name}");
                if package == current_package {
                    quote! { crate::#name }
                } else {
                    let package = format_ident!("{package}");
                    quote! { ::#package::#name }
                }
            }
        }
    }

    /// Map a primitive IDL type to its Rust counterpart
    #[must_use]
    pub fn map_primitive(&self, primitive: Primitive) -> TokenStream {
        match primitive {
            Primitive::Bool => quote! { bool },
            Primitive::Byte | Primitive::Char | Primitive::UInt8 => quote! { u8 },
            Primitive::Int8 => quote! { i8 },
            Primitive::Int16 => quote! { i16 },
            Primitive::UInt16 => quote! { u16 },
            Primitive::Int32 => quote! { i32 },
            Primitive::UInt32 => quote! { u32 },
            Primitive::Int64 => quote! { i64 },
            Primitive::UInt64 => quote! { u64 },
            Primitive::Float32 => quote! { f32 },
            Primitive::Float64 => quote! { f64 },
            Primitive::String => quote! { ::std::string::String },
            Primitive::Time => quote! { ::rosidl_runtime::Time },
            Primitive::Duration => quote! { ::rosidl_runtime::Duration },
        }
    }

    /// Rust type tokens for a constant of a primitive type
    ///
    /// String constants become `&'static str`; everything else matches the
    /// field mapping.
    #[must_use]
    pub fn const_type(&self, primitive: Primitive) -> TokenStream {
        match primitive {
            Primitive::String => quote! { &'static str },
            other => self.map_primitive(other),
        }
    }

    /// Documentation note recording an advisory array bound, if any.
    ///
    /// The bound is metadata only and never enforced in generated code.
    #[must_use]
    pub fn bound_note(&self, arity: Arity) -> Option<String> {
        match arity {
            Arity::Bounded(n) => Some(format!(
                " Bounded sequence: at most {n} elements. The bound is advisory and not enforced."
            )),
            _ => None,
        }
    }
}
