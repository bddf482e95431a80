//! FromRow derive macro implementation

use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Field, Fields, Ident, Result};

#[derive(Clone, Copy)]
enum RenameRule {
    Camel,
    Pascal,
    Snake,
    ScreamingSnake,
}

impl RenameRule {
    fn parse(lit: &syn::LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "camelCase" => Ok(RenameRule::Camel),
            "PascalCase" => Ok(RenameRule::Pascal),
            "snake_case" => Ok(RenameRule::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(RenameRule::ScreamingSnake),
            other => Err(Error::new(
                lit.span(),
                format!("unsupported rename_all rule `{}`", other),
            )),
        }
    }

    fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Camel => field.to_lower_camel_case(),
            RenameRule::Pascal => field.to_pascal_case(),
            RenameRule::Snake => field.to_snake_case(),
            RenameRule::ScreamingSnake => field.to_shouty_snake_case(),
        }
    }
}

/// Parsed `#[repdb(...)]` configuration of one field
struct FieldConfig {
    ident: Ident,
    column_name: String,
    skip: bool,
    default: bool,
    ty: syn::Type,
}

fn attr_name(path: &syn::Path) -> String {
    path.get_ident().map(|i| i.to_string()).unwrap_or_default()
}

fn parse_container_rule(input: &DeriveInput) -> Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in &input.attrs {
        if attr.path().is_ident("repdb") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    rule = Some(RenameRule::parse(&lit)?);
                    Ok(())
                } else {
                    Err(meta.error(format!(
                        "unknown repdb container attribute `{}`",
                        attr_name(&meta.path)
                    )))
                }
            })?;
        }
    }
    Ok(rule)
}

fn parse_field_config(field: &Field, rule: Option<RenameRule>) -> Result<FieldConfig> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new(field.span(), "tuple structs are not supported"))?;

    let raw = ident.to_string();
    let raw = raw.strip_prefix("r#").unwrap_or(&raw);
    let mut column_name = match rule {
        Some(rule) => rule.apply(raw),
        None => raw.to_string(),
    };
    let mut skip = false;
    let mut default = false;

    for attr in &field.attrs {
        if attr.path().is_ident("repdb") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    column_name = lit.value();
                } else if meta.path.is_ident("skip") {
                    skip = true;
                } else if meta.path.is_ident("default") {
                    default = true;
                } else {
                    return Err(meta.error(format!(
                        "unknown repdb attribute `{}`",
                        attr_name(&meta.path)
                    )));
                }
                Ok(())
            })?;
        }
    }

    Ok(FieldConfig {
        ident,
        column_name,
        skip,
        default,
        ty: field.ty.clone(),
    })
}

pub fn derive_from_row_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(input.span(), "only structs are supported")),
    };

    let rule = parse_container_rule(&input)?;
    let field_configs: Vec<FieldConfig> = fields
        .iter()
        .map(|field| parse_field_config(field, rule))
        .collect::<Result<Vec<_>>>()?;

    let field_extractions: Vec<TokenStream> = field_configs
        .iter()
        .map(|config| {
            let field_ident = &config.ident;
            let column_name = &config.column_name;
            let ty = &config.ty;

            if config.skip {
                quote! {
                    #field_ident: <#ty as std::default::Default>::default()
                }
            } else if config.default {
                // Missing column or NULL falls back to Default; a present
                // value that fails to convert is still an error.
                quote! {
                    #field_ident: match repdb::Row::get_value(row, #column_name) {
                        Ok(value) if !value.is_null() => {
                            <#ty as repdb::FromValue>::from_value(value)?
                        }
                        _ => <#ty as std::default::Default>::default(),
                    }
                }
            } else {
                quote! {
                    #field_ident: repdb::RowExt::get::<#ty>(row, #column_name)?
                }
            }
        })
        .collect();

    let column_names: Vec<&str> = field_configs
        .iter()
        .filter(|c| !c.skip)
        .map(|c| c.column_name.as_str())
        .collect();

    let expanded = quote! {
        impl #impl_generics repdb::FromRow for #name #ty_generics #where_clause {
            fn from_row<R: repdb::Row>(row: &R) -> repdb::Result<Self> {
                Ok(Self {
                    #(#field_extractions),*
                })
            }

            fn column_names() -> &'static [&'static str] {
                &[#(#column_names),*]
            }
        }
    };

    Ok(expanded)
}
