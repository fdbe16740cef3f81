//! Bridge Macros - Proc macro for exposing methods to JavaScript hosts
//!
//! This crate provides the `#[exposed]` attribute macro, which turns an
//! inherent `impl` block into an `Exposed` implementation with a method
//! table built from its `#[expose]`-marked methods.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Expr, FnArg, ImplItem, ImplItemFn, ItemImpl, Lit, Meta, ReturnType, Token,
    Type,
};

/// Handlers are implemented for up to this many parameters
const MAX_PARAMS: usize = 6;

const INTEGER_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];

// ─────────────────────────────────────────────────────────────────────────────
// Attribute Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed attributes for the exposed macro
#[derive(Default)]
struct ExposedAttrs {
    /// Type name used in logs (defaults to the self type)
    name: Option<String>,
    /// Associated `fn() -> Self` used to construct instances
    constructor: Option<syn::Ident>,
}

impl Parse for ExposedAttrs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut attrs = ExposedAttrs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let lit: syn::LitStr = input.parse()?;

            match ident.to_string().as_str() {
                "name" => attrs.name = Some(lit.value()),
                "constructor" => attrs.constructor = Some(lit.parse()?),
                _ => {
                    return Err(syn::Error::new(ident.span(), format!("unknown attribute: {}", ident)));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(attrs)
    }
}

/// Parsed `#[expose(...)]` attribute on a method
#[derive(Default)]
struct ExposeAttrs {
    /// Name to expose as (defaults to the method name)
    name: Option<String>,
    /// Whether this method is the type's self-enumeration accessor
    enumerate: bool,
}

impl Parse for ExposeAttrs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut attrs = ExposeAttrs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;

            match ident.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    let lit: syn::LitStr = input.parse()?;
                    attrs.name = Some(lit.value());
                }
                "enumerate" => attrs.enumerate = true,
                _ => {
                    return Err(syn::Error::new(ident.span(), format!("unknown attribute: {}", ident)));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(attrs)
    }
}

/// Remove the `#[expose]` attribute from a method, returning its parsed form
fn take_expose_attr(method: &mut ImplItemFn) -> syn::Result<Option<ExposeAttrs>> {
    let Some(pos) = method.attrs.iter().position(|a| a.path().is_ident("expose")) else {
        return Ok(None);
    };
    let attr = method.attrs.remove(pos);

    match &attr.meta {
        Meta::Path(_) => Ok(Some(ExposeAttrs::default())),
        Meta::List(_) => attr.parse_args::<ExposeAttrs>().map(Some),
        Meta::NameValue(meta) => Err(syn::Error::new_spanned(meta, "expected #[expose] or #[expose(...)]")),
    }
}

/// Extract doc comments from attributes
fn extract_doc_comment(attrs: &[syn::Attribute]) -> Option<String> {
    let docs: Vec<String> = attrs
        .iter()
        .filter_map(|attr| {
            if attr.path().is_ident("doc") {
                if let Meta::NameValue(meta) = &attr.meta {
                    if let Expr::Lit(expr_lit) = &meta.value {
                        if let Lit::Str(s) = &expr_lit.lit {
                            return Some(s.value().trim().to_string());
                        }
                    }
                }
            }
            None
        })
        .collect();

    if docs.is_empty() {
        None
    } else {
        Some(docs.join("\n"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Type Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Last path segment of a plain type path
fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        Type::Group(group) => last_segment(&group.elem),
        Type::Paren(paren) => last_segment(&paren.elem),
        _ => None,
    }
}

fn type_args(segment: &syn::PathSegment) -> Vec<&Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_named(ty: &Type, names: &[&str]) -> bool {
    last_segment(ty).is_some_and(|seg| {
        seg.arguments.is_empty() && names.contains(&seg.ident.to_string().as_str())
    })
}

/// Whether a parameter type has a coercion rule
///
/// Decided syntactically; type aliases of coercible types are not recognized.
fn is_coercible(ty: &Type) -> bool {
    let Some(segment) = last_segment(ty) else {
        return false;
    };
    let args = type_args(segment);

    match (segment.ident.to_string().as_str(), args.as_slice()) {
        (name, []) if segment.arguments.is_empty() => {
            INTEGER_TYPES.contains(&name)
                || matches!(name, "f32" | "f64" | "bool" | "String" | "Duration")
        }
        ("Vec", [elem]) => is_named(elem, INTEGER_TYPES),
        ("HashMap" | "BTreeMap", [key, value]) => {
            is_named(key, INTEGER_TYPES) && is_named(value, &["f64"])
        }
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Method Collection
// ─────────────────────────────────────────────────────────────────────────────

/// One `#[expose]`-marked method
struct ExposedMethod {
    ident: syn::Ident,
    name: String,
    description: Option<String>,
    enumerate: bool,
    params: Vec<Type>,
}

fn check_signature(method: &ImplItemFn) -> syn::Result<Vec<Type>> {
    let sig = &method.sig;

    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(sig.asyncness, "exposed methods cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&sig.generics, "exposed methods cannot be generic"));
    }

    match sig.receiver() {
        Some(receiver) if receiver.reference.is_some() => {}
        Some(receiver) => {
            return Err(syn::Error::new_spanned(
                receiver,
                "exposed methods must take &self or &mut self",
            ));
        }
        None => {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "exposed methods must take &self or &mut self",
            ));
        }
    }

    // Borrowed returns would outlive the instance lock; only 'static ones are allowed
    if let ReturnType::Type(_, ty) = &sig.output {
        if let Type::Reference(r) = &**ty {
            let is_static = r.lifetime.as_ref().is_some_and(|l| l.ident == "static");
            if !is_static {
                return Err(syn::Error::new_spanned(
                    ty,
                    "exposed methods must return owned or 'static values",
                ));
            }
        }
    }

    let mut params = Vec::new();
    for input in sig.inputs.iter() {
        if let FnArg::Typed(pat_type) = input {
            if matches!(*pat_type.ty, Type::Reference(_)) {
                return Err(syn::Error::new_spanned(
                    &pat_type.ty,
                    "exposed method parameters must be owned types",
                ));
            }
            params.push((*pat_type.ty).clone());
        }
    }

    if params.len() > MAX_PARAMS {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            format!("exposed methods take at most {} parameters", MAX_PARAMS),
        ));
    }

    Ok(params)
}

fn collect_methods(item: &mut ItemImpl) -> syn::Result<Vec<ExposedMethod>> {
    let mut methods = Vec::new();
    let mut enumerate_seen = false;

    for impl_item in item.items.iter_mut() {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let Some(attrs) = take_expose_attr(method)? else {
            continue;
        };
        let params = check_signature(method)?;

        if attrs.enumerate {
            if enumerate_seen {
                return Err(syn::Error::new_spanned(
                    &method.sig.ident,
                    "only one method can be marked #[expose(enumerate)]",
                ));
            }
            enumerate_seen = true;
        }

        let ident = method.sig.ident.clone();
        methods.push(ExposedMethod {
            name: attrs.name.unwrap_or_else(|| ident.to_string()),
            description: extract_doc_comment(&method.attrs),
            enumerate: attrs.enumerate,
            ident,
            params,
        });
    }

    Ok(methods)
}

// ─────────────────────────────────────────────────────────────────────────────
// Code Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Registration statement for one method
fn registration(method: &ExposedMethod) -> TokenStream2 {
    let ident = &method.ident;
    let name = &method.name;
    let description = match &method.description {
        Some(doc) => quote! { ::core::option::Option::Some(#doc) },
        None => quote! { ::core::option::Option::None },
    };

    let mut closure_params = Vec::new();
    let mut call_args = Vec::new();
    for (i, ty) in method.params.iter().enumerate() {
        let arg = format_ident!("arg{}", i);
        if is_coercible(ty) {
            closure_params.push(quote! { #arg: #ty });
            call_args.push(quote! { #arg });
        } else if method.enumerate {
            closure_params.push(quote! { #arg: ::bridge_runtime::Placeholder<#ty> });
            call_args.push(quote! { #arg.into_inner() });
        } else {
            closure_params.push(quote! { #arg: ::bridge_runtime::Unsupported<#ty> });
            call_args.push(quote! { #arg.into_inner() });
        }
    }

    let register = if method.enumerate {
        quote! { register_enumeration }
    } else {
        quote! { register }
    };

    quote! {
        table.#register(
            #name,
            #description,
            |this: &mut Self #(, #closure_params)*| this.#ident(#(#call_args),*),
        );
    }
}

/// Override of `Exposed::enumerate` calling the marked method with zero values
fn enumeration_override(method: &ExposedMethod) -> TokenStream2 {
    let ident = &method.ident;
    let zero_values = method
        .params
        .iter()
        .map(|ty| quote! { <#ty as ::core::default::Default>::default() });

    quote! {
        fn enumerate(
            &mut self,
            _table: &::bridge_runtime::MethodTable<Self>,
        ) -> ::core::result::Result<::std::vec::Vec<::std::string::String>, ::bridge_runtime::EnumerationError> {
            ::bridge_runtime::MethodListing::into_method_names(self.#ident(#(#zero_values),*))
        }
    }
}

fn expand(attrs: ExposedAttrs, mut item: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(path, "#[exposed] requires an inherent impl block"));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&item.generics, "#[exposed] impl blocks cannot be generic"));
    }

    let methods = collect_methods(&mut item)?;
    let self_ty = &item.self_ty;

    let type_name = attrs
        .name
        .unwrap_or_else(|| quote!(#self_ty).to_string().replace(' ', ""));
    let construct = match &attrs.constructor {
        Some(ctor) => quote! { Self::#ctor() },
        None => quote! { <Self as ::core::default::Default>::default() },
    };
    let registrations = methods.iter().map(registration);
    let enumerate = methods
        .iter()
        .find(|m| m.enumerate)
        .map(enumeration_override)
        .unwrap_or_default();

    Ok(quote! {
        #item

        impl ::bridge_runtime::Exposed for #self_ty {
            const TYPE_NAME: &'static str = #type_name;

            fn construct() -> Self {
                #construct
            }

            fn method_table() -> ::bridge_runtime::MethodTable<Self> {
                let mut table = ::bridge_runtime::MethodTable::new();
                #(#registrations)*
                table
            }

            #enumerate
        }
    })
}

/// Attribute macro for exposing an object's methods to JavaScript hosts.
///
/// Placed on an inherent `impl` block. Only methods marked `#[expose]` are
/// exposed; their doc comments become method descriptions.
///
/// # Attributes
///
/// - `name` (optional): Type name used in logs (defaults to the self type)
/// - `constructor` (optional): Associated `fn() -> Self` building instances
///   (defaults to `Default::default`)
///
/// # Method Attributes
///
/// - `#[expose]`: Expose under the method's own name
/// - `#[expose(name = "Add")]`: Expose under another name
/// - `#[expose(enumerate)]`: Mark the self-enumeration accessor. Parameters
///   without a coercion rule receive their zero value.
///
/// # Example
///
/// ```ignore
/// #[bridge_runtime::exposed(name = "Counter", constructor = "new")]
/// impl Counter {
///     /// Add two integers.
///     #[expose(name = "Add")]
///     fn add(&self, a: i64, b: i64) -> i64 {
///         a + b
///     }
///
///     #[expose(enumerate)]
///     fn methods(&self) -> Vec<&'static str> {
///         vec!["Add"]
///     }
/// }
/// ```
///
/// This generates an `impl bridge_runtime::Exposed for Counter` whose
/// method table registers `Add` and whose `enumerate` calls `methods`.
#[proc_macro_attribute]
pub fn exposed(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = parse_macro_input!(attr as ExposedAttrs);
    let item = parse_macro_input!(item as ItemImpl);

    match expand(attrs, item) {
        Ok(output) => output.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_static_reference_return_allowed() {
        let method: ImplItemFn = parse_quote! {
            fn ping(&self) -> &'static str { "pong" }
        };
        assert!(check_signature(&method).unwrap().is_empty());
    }

    #[test]
    fn test_borrowed_return_rejected() {
        let elided: ImplItemFn = parse_quote! {
            fn label(&self) -> &str { &self.label }
        };
        let named: ImplItemFn = parse_quote! {
            fn label<'a>(&'a self) -> &'a str { &self.label }
        };
        let err = check_signature(&elided).unwrap_err();
        assert!(err.to_string().contains("owned or 'static"));
        assert!(check_signature(&named).is_err());
    }
}
