extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{
    Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit, Meta, Token, UnOp, Visibility,
    parse_macro_input,
};

const ATTR: &str = "litemodel";
const DEFAULT_MAX_LENGTH: u32 = 140;

/// Maps a struct with named fields onto a table definition.
///
/// ```ignore
/// #[litemodel(table_name = "players")]
/// pub struct Player {
///     #[litemodel(primary_key, auto_increment)]
///     pub id: i64,
///     #[litemodel(column = "display_name", not_null, collate = "NOCASE")]
///     pub name: String,
///     #[litemodel(default = 0)]
///     pub score: f64,
///     #[litemodel(enumeration)]
///     pub class: Class,
///     #[litemodel(ignore)]
///     pub cached_rank: Option<u32>,
/// }
/// ```
///
/// Only `pub` fields become columns.
#[proc_macro_attribute]
pub fn litemodel(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as DeriveInput);
    match expand(attr.into(), &mut input) {
        Ok(tokens) => tokens.into(),
        Err(err) => {
            let err = err.to_compile_error();
            quote!(#input #err).into()
        }
    }
}

#[derive(Default)]
struct FieldMarkers {
    column: Option<String>,
    primary_key: bool,
    auto_increment: bool,
    not_null: bool,
    unique: bool,
    default: Option<TokenStream2>,
    collate: Option<String>,
    max_length: Option<u32>,
    ignore: bool,
    enumeration: bool,
}

fn expand(attr: TokenStream2, input: &mut DeriveInput) -> syn::Result<TokenStream2> {
    // -------- table_name parsing --------
    let mut table_name: Option<String> = None;
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(attr)?;
    for meta in metas {
        match &meta {
            Meta::NameValue(nv) if nv.path.is_ident("table_name") => {
                table_name = Some(lit_str(&nv.value)?);
            }
            _ => return Err(syn::Error::new_spanned(meta, "expected `table_name = \"...\"`")),
        }
    }

    let struct_name = input.ident.clone();
    let fields = match &mut input.data {
        Data::Struct(s) => match &mut s.fields {
            Fields::Named(named) => &mut named.named,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "#[litemodel] needs a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &struct_name,
                "#[litemodel] can only be used on structs",
            ));
        }
    };

    // -------- fields --------
    let mut defs = Vec::new();
    for field in fields.iter_mut() {
        let mut markers = FieldMarkers::default();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
            let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            for meta in metas {
                parse_marker(&meta, &mut markers)?;
            }
        }
        // Strip our markers so the emitted struct compiles.
        field.attrs.retain(|a| !a.path().is_ident(ATTR));

        if !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        defs.push(field_definition(&ident.unraw().to_string(), &field.ty, markers));
    }

    // -------- generate output --------
    let ident_str = struct_name.to_string();
    let table_name = table_name.map(|name| quote!(.table_name(#name)));
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::litemodel::Model for #struct_name #ty_generics #where_clause {
            fn definition() -> ::litemodel::TableDefinition {
                ::litemodel::TableDefinition::new(#ident_str)
                    #table_name
                    #(.field(#defs))*
            }
        }
    })
}

fn parse_marker(meta: &Meta, markers: &mut FieldMarkers) -> syn::Result<()> {
    match meta {
        Meta::Path(path) => {
            let Some(ident) = path.get_ident() else {
                return Err(syn::Error::new_spanned(path, "unknown litemodel marker"));
            };
            match ident.to_string().as_str() {
                "primary_key" | "primary" => markers.primary_key = true,
                "auto_increment" => markers.auto_increment = true,
                "not_null" => markers.not_null = true,
                "unique" => markers.unique = true,
                "ignore" => markers.ignore = true,
                "enumeration" => markers.enumeration = true,
                "max_length" => markers.max_length = Some(DEFAULT_MAX_LENGTH),
                _ => return Err(syn::Error::new_spanned(path, "unknown litemodel marker")),
            }
        }
        Meta::NameValue(nv) => {
            let Some(ident) = nv.path.get_ident() else {
                return Err(syn::Error::new_spanned(&nv.path, "unknown litemodel marker"));
            };
            match ident.to_string().as_str() {
                "column" => markers.column = Some(lit_str(&nv.value)?),
                "collate" => markers.collate = Some(lit_str(&nv.value)?),
                "default" => markers.default = Some(default_value(&nv.value)?),
                "max_length" => match &nv.value {
                    Expr::Lit(ExprLit {
                        lit: Lit::Int(int), ..
                    }) => markers.max_length = Some(int.base10_parse()?),
                    other => {
                        return Err(syn::Error::new_spanned(other, "expected an integer length"));
                    }
                },
                _ => return Err(syn::Error::new_spanned(&nv.path, "unknown litemodel marker")),
            }
        }
        Meta::List(list) => {
            return Err(syn::Error::new_spanned(list, "unexpected nested list"));
        }
    }
    Ok(())
}

fn lit_str(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn default_value(expr: &Expr) -> syn::Result<TokenStream2> {
    let (negative, lit) = match expr {
        Expr::Lit(ExprLit { lit, .. }) => (false, lit),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => match expr.as_ref() {
            Expr::Lit(ExprLit { lit, .. }) => (true, lit),
            other => return Err(syn::Error::new_spanned(other, "expected a literal")),
        },
        other => return Err(syn::Error::new_spanned(other, "expected a literal")),
    };
    let sign = if negative { -1 } else { 1 };

    let tokens = match lit {
        Lit::Int(int) => {
            let v = sign * int.base10_parse::<i64>()?;
            quote!(::litemodel::DefaultValue::Integer(#v))
        }
        Lit::Float(float) => {
            let v = sign as f64 * float.base10_parse::<f64>()?;
            quote!(::litemodel::DefaultValue::Real(#v))
        }
        Lit::Str(s) if !negative => {
            let v = s.value();
            quote!(::litemodel::DefaultValue::Text(::std::string::String::from(#v)))
        }
        Lit::Bool(b) if !negative => {
            let v = b.value;
            quote!(::litemodel::DefaultValue::Bool(#v))
        }
        other => return Err(syn::Error::new_spanned(other, "unsupported default value")),
    };
    Ok(tokens)
}

fn field_definition(name: &str, ty: &syn::Type, m: FieldMarkers) -> TokenStream2 {
    // Spacing is kept so lifetimes stay separable from the type name.
    let ty_str = quote!(#ty).to_string();
    let type_tag = if m.enumeration {
        let enum_name: String = ty_str.chars().filter(|c| !c.is_whitespace()).collect();
        quote!(::litemodel::TypeTag::Enum(::std::string::String::from(#enum_name)))
    } else {
        quote!(::litemodel::TypeTag::from_rust_type(#ty_str))
    };

    let mut chain = vec![quote!(::litemodel::FieldDefinition::new(#name, #type_tag))];
    if let Some(column) = m.column {
        chain.push(quote!(.column(#column)));
    }
    if m.primary_key {
        chain.push(quote!(.primary_key()));
    }
    if m.auto_increment {
        chain.push(quote!(.auto_increment()));
    }
    if m.not_null {
        chain.push(quote!(.not_null()));
    }
    if m.unique {
        chain.push(quote!(.unique()));
    }
    if let Some(default) = m.default {
        chain.push(quote!(.default(#default)));
    }
    if let Some(collate) = m.collate {
        chain.push(quote!(.collate(#collate)));
    }
    if let Some(len) = m.max_length {
        chain.push(quote!(.max_length(#len)));
    }
    if m.ignore {
        chain.push(quote!(.ignore()));
    }
    quote!(#(#chain)*)
}
