//! Code emission: message model to Rust source text

use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{format_ident, quote};

use super::{GeneratorError, GeneratorResult, ModelCatalog, TypeMapper};
use crate::msg::{Arity, MessageModel, PrimitiveValue, ResolvedType, Value};

/// Generates one Rust source unit per message model
///
/// The emitted unit contains a single `#[repr(C)]` struct named after the
/// message, one public field per declared field in order, an `impl` block of
/// constants, and a `Default` impl carrying the declared default values.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    mapper: TypeMapper,
}

impl CodeGenerator {
    /// Create a new code generator
    #[must_use]
    pub fn new() -> Self {
        Self {
            mapper: TypeMapper::new(),
        }
    }

    /// Generate Rust source text for a message model.
    ///
    /// Pure function: no file I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::UnresolvedType`] if a composite field type
    /// is not present in `catalog`, or [`GeneratorError::Render`] if the
    /// emitted tokens fail to parse as a Rust file.
    pub fn generate(
        &self,
        model: &MessageModel,
        catalog: &ModelCatalog,
    ) -> GeneratorResult<String> {
        self.check_field_names(model)?;
        self.check_composites(model, catalog)?;

        let mut tokens = self.struct_tokens(model);
        tokens.extend(self.constants_tokens(model));
        tokens.extend(self.default_tokens(model));

        let body = format_tokens(tokens)?;
        Ok(format!(
            "// Generated by ros2msgc from {}. Do not edit.\n\n{body}",
            model.full_name()
        ))
    }

    /// Reject field names that raw identifiers cannot express
    fn check_field_names(&self, model: &MessageModel) -> GeneratorResult<()> {
        for field in &model.fields {
            if RESERVED_FIELD_NAMES.contains(&field.name.as_str()) {
                return Err(GeneratorError::ReservedFieldName {
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every composite field type must resolve against the supplied models
    fn check_composites(
        &self,
        model: &MessageModel,
        catalog: &ModelCatalog,
    ) -> GeneratorResult<()> {
        for field in &model.fields {
            if let ResolvedType::Composite { package, name } = &field.ty.base
                && !catalog.contains(package, name)
            {
                return Err(GeneratorError::UnresolvedType {
                    package: package.clone(),
                    type_name: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn struct_tokens(&self, model: &MessageModel) -> TokenStream {
        let name = format_ident!("{}", model.name);
        let fields: Vec<TokenStream> = model
            .fields
            .iter()
            .map(|field| {
                let ident = field_ident(&field.name);
                let ty = self.mapper.map_type(&field.ty, &model.package);
                let doc = self
                    .mapper
                    .bound_note(field.ty.arity)
                    .map(|note| quote! { #[doc = #note] });
                quote! {
                    #doc
                    pub #ident: #ty,
                }
            })
            .collect();

        quote! {
            #[repr(C)]
            #[derive(Debug, Clone, PartialEq)]
            pub struct #name {
                #(#fields)*
            }
        }
    }

    fn constants_tokens(&self, model: &MessageModel) -> TokenStream {
        if model.constants.is_empty() {
            return TokenStream::new();
        }

        let name = format_ident!("{}", model.name);
        let constants: Vec<TokenStream> = model
            .constants
            .iter()
            .map(|constant| {
                let ident = format_ident!("{}", constant.name);
                let ty = self.mapper.const_type(constant.ty);
                let value = const_value_tokens(&constant.value);
                quote! {
                    pub const #ident: #ty = #value;
                }
            })
            .collect();

        quote! {
            impl #name {
                #(#constants)*
            }
        }
    }

    fn default_tokens(&self, model: &MessageModel) -> TokenStream {
        let name = format_ident!("{}", model.name);
        let inits: Vec<TokenStream> = model
            .fields
            .iter()
            .map(|field| {
                let ident = field_ident(&field.name);
                let value = default_value_tokens(field.default.as_ref(), field.ty.arity);
                quote! { #ident: #value, }
            })
            .collect();

        quote! {
            impl ::core::default::Default for #name {
                #[inline]
                fn default() -> Self {
                    Self {
                        #(#inits)*
                    }
                }
            }
        }
    }
}

/// Keywords `Ident::new_raw` panics on; these can never name a struct field
const RESERVED_FIELD_NAMES: &[&str] = &["self", "Self", "super", "crate"];

/// Field identifier, falling back to a raw identifier for Rust keywords
/// (an IDL field may legally be named `type` or `match`).
/// Callers must have screened out [`RESERVED_FIELD_NAMES`] first.
fn field_ident(name: &str) -> Ident {
    syn::parse_str::<Ident>(name)
        .unwrap_or_else(|_| Ident::new_raw(name, Span::call_site()))
}

/// Literal tokens for a constant value
fn const_value_tokens(value: &PrimitiveValue) -> TokenStream {
    match value {
        PrimitiveValue::String(s) => {
            let lit = Literal::string(s);
            quote! { #lit }
        }
        other => literal_tokens(other),
    }
}

/// Initializer tokens for a field in the `Default` impl
fn default_value_tokens(default: Option<&Value>, arity: Arity) -> TokenStream {
    match default {
        Some(Value::Primitive(value)) => owned_literal_tokens(value),
        Some(Value::Array(values)) => {
            let elements: Vec<TokenStream> = values.iter().map(owned_literal_tokens).collect();
            match arity {
                Arity::Fixed(_) => quote! { [#(#elements),*] },
                _ => quote! { ::std::vec![#(#elements),*] },
            }
        }
        None => match arity {
            Arity::Scalar => quote! { ::core::default::Default::default() },
            Arity::Fixed(_) => {
                quote! { ::core::array::from_fn(|_| ::core::default::Default::default()) }
            }
            Arity::Bounded(_) | Arity::Unbounded => quote! { ::std::vec::Vec::new() },
        },
    }
}

/// Literal tokens producing an owned value (strings become `String`)
fn owned_literal_tokens(value: &PrimitiveValue) -> TokenStream {
    match value {
        PrimitiveValue::String(s) => {
            let lit = Literal::string(s);
            quote! { ::std::string::String::from(#lit) }
        }
        other => literal_tokens(other),
    }
}

/// Tokens for non-string primitive values, as unsuffixed literals so the
/// emitted source reads like hand-written code
fn literal_tokens(value: &PrimitiveValue) -> TokenStream {
    let lit = match value {
        PrimitiveValue::Bool(v) => return quote! { #v },
        PrimitiveValue::Int8(v) => Literal::i8_unsuffixed(*v),
        PrimitiveValue::UInt8(v) => Literal::u8_unsuffixed(*v),
        PrimitiveValue::Int16(v) => Literal::i16_unsuffixed(*v),
        PrimitiveValue::UInt16(v) => Literal::u16_unsuffixed(*v),
        PrimitiveValue::Int32(v) => Literal::i32_unsuffixed(*v),
        PrimitiveValue::UInt32(v) => Literal::u32_unsuffixed(*v),
        PrimitiveValue::Int64(v) => Literal::i64_unsuffixed(*v),
        PrimitiveValue::UInt64(v) => Literal::u64_unsuffixed(*v),
        PrimitiveValue::Float32(v) => Literal::f32_unsuffixed(*v),
        PrimitiveValue::Float64(v) => Literal::f64_unsuffixed(*v),
        PrimitiveValue::String(v) => Literal::string(v),
    };
    quote! { #lit }
}

/// Format a `TokenStream` into a pretty-printed source string
fn format_tokens(tokens: TokenStream) -> Result<String, syn::Error> {
    let syntax_tree = syn::parse2::<syn::File>(tokens)?;
    Ok(prettyplease::unparse(&syntax_tree))
}
