mod field;

use darling::{
    FromDeriveInput,
    ast::{Data, Fields},
};
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{DeriveInput, ExprPath, Generics, Ident, ext::IdentExt, parse_macro_input};

use crate::field::{EnvAttribute, EnvSchemaFieldReceiver};

#[proc_macro_derive(EnvSchema, attributes(env))]
pub fn derive_env_schema(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive(input) {
        Ok(output) => output.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn impl_derive(input: DeriveInput) -> darling::Result<TokenStream> {
    let schema_struct = EnvSchemaReceiver::from_derive_input(&input)?;

    schema_struct.validate()?;

    Ok(schema_struct.to_token_stream())
}

#[derive(FromDeriveInput)]
#[darling(supports(struct_named))]
struct EnvSchemaReceiver {
    pub ident: Ident,
    pub generics: Generics,
    pub data: Data<(), EnvSchemaFieldReceiver>,
}

struct ConstTokens {
    private_path: TokenStream,
    errors_ident: Ident,
    env_ident: Ident,
    fields_ident: Ident,
}

impl ToTokens for EnvSchemaReceiver {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let consts = ConstTokens {
            private_path: quote!(__envschema::__private),
            errors_ident: format_ident!("__envschema_derive_errors"),
            env_ident: format_ident!("__envschema_derive_env"),
            fields_ident: format_ident!("__envschema_derive_fields"),
        };
        let private_path = &consts.private_path;

        let impl_env_schema = self.impl_env_schema(&consts);

        let derive = quote! {
            const _: () = {
                extern crate envschema as __envschema;
                use #private_path::Parser as _;

                #impl_env_schema
            };
        };

        tokens.extend(derive);
    }
}

impl EnvSchemaReceiver {
    fn validate(&self) -> darling::Result<()> {
        if self.generics.params.is_empty() {
            Ok(())
        } else {
            Err(
                darling::Error::custom("EnvSchema derive does not support generic structs")
                    .with_span(&self.generics),
            )
        }
    }

    fn impl_env_schema(&self, consts: &ConstTokens) -> TokenStream {
        let struct_name = &self.ident;
        let private_path = &consts.private_path;
        let errors_ident = &consts.errors_ident;
        let env_ident = &consts.env_ident;
        let fields_ident = &consts.fields_ident;

        let declarations = self.get_fields().iter().map(|field| {
            let ty = field.option.as_ref().unwrap_or(&field.ty);

            match &field.env_attr {
                EnvAttribute::Nested => {
                    quote! {
                        <#ty as #private_path::EnvSchema>::declare(#fields_ident);
                    }
                }
                EnvAttribute::Flat { from, default, .. } => {
                    let default = match default {
                        Some(default) => quote!(::core::option::Option::Some(#default)),
                        None => quote!(::core::option::Option::None),
                    };
                    let optional = field.option.is_some();

                    quote! {
                        #fields_ident.push(#private_path::FieldSpec {
                            env_var: #from,
                            default: #default,
                            optional: #optional,
                        });
                    }
                }
            }
        });

        // Every field is attempted before any error is returned, so a single
        // pass reports everything that is wrong.
        let assignments = self
            .get_fields()
            .iter()
            .map(|field| self.field_assignment(field, consts));

        let fields = self.get_fields().iter().map(|field| {
            let ident = &field.ident;

            quote! {
                #ident: match #ident {
                    ::core::result::Result::Ok(val) => val,
                    ::core::result::Result::Err(_) => {
                        return ::core::result::Result::Err(#errors_ident);
                    }
                }
            }
        });

        quote! {
            impl #private_path::EnvSchema for #struct_name {
                #[allow(unused_variables)]
                fn declare(#fields_ident: &mut ::std::vec::Vec<#private_path::FieldSpec>) {
                    #(#declarations)*
                }

                #[allow(unused_mut, unused_variables)]
                fn validate(
                    #env_ident: &dyn #private_path::Environment,
                ) -> ::core::result::Result<Self, #private_path::FieldErrors> {
                    let mut #errors_ident = #private_path::FieldErrors::new();

                    #(#assignments)*

                    ::core::result::Result::Ok(#struct_name {
                        #(#fields,)*
                    })
                }
            }
        }
    }

    fn field_assignment(&self, field: &EnvSchemaFieldReceiver, consts: &ConstTokens) -> TokenStream {
        let private_path = &consts.private_path;
        let errors_ident = &consts.errors_ident;
        let env_ident = &consts.env_ident;
        let ident = &field.ident;
        let path = format!("{}.{}", self.ident, ident.unraw());

        match (&field.env_attr, field.option.as_ref()) {
            // #[env(nested)] field: T,
            (EnvAttribute::Nested, None) => {
                let ty = &field.ty;

                quote! {
                    let #ident = <#ty as #private_path::EnvSchema>::validate(#env_ident)
                        .map_err(|nested| #errors_ident.append(nested));
                }
            }
            // #[env(nested)] field: Option<T>,
            (EnvAttribute::Nested, Some(ty)) => {
                quote! {
                    let #ident = match <#ty as #private_path::EnvSchema>::validate(#env_ident) {
                        ::core::result::Result::Ok(inner) => {
                            ::core::result::Result::Ok(::core::option::Option::Some(inner))
                        }
                        ::core::result::Result::Err(nested) if nested.all_missing() => {
                            ::core::result::Result::Ok(::core::option::Option::None)
                        }
                        ::core::result::Result::Err(nested) => {
                            #errors_ident.append(nested);
                            ::core::result::Result::Err(())
                        }
                    };
                }
            }
            // #[env(from = "...")] field: T, with or without a default
            (EnvAttribute::Flat { from, default, with }, None) => {
                let with = parser_path(consts, with.as_ref());
                let reject = reject(consts, &path, from);

                let when_unset = match default {
                    Some(default) => quote! {
                        #with.parse_value(#default).map_err(#reject)
                    },
                    None => quote! {
                        ::core::result::Result::Err(#private_path::FieldErrorKind::Missing)
                            .map_err(#reject)
                    },
                };

                quote! {
                    let #ident = match #with.parse_from_env(#env_ident, #from) {
                        ::core::option::Option::Some(parsed) => parsed.map_err(#reject),
                        ::core::option::Option::None => #when_unset,
                    };
                }
            }
            // #[env(from = "...")] field: Option<T>
            (EnvAttribute::Flat { from, with, .. }, Some(_)) => {
                let with = parser_path(consts, with.as_ref());
                let reject = reject(consts, &path, from);

                quote! {
                    let #ident = #with
                        .parse_from_env(#env_ident, #from)
                        .transpose()
                        .map_err(#reject);
                }
            }
        }
    }

    fn get_fields(&self) -> &Fields<EnvSchemaFieldReceiver> {
        let Data::Struct(fields) = &self.data else {
            unreachable!("darling only accepts named structs");
        };

        fields
    }
}

/// A closure recording a `FieldErrorKind` against this field, for use with
/// `map_err` so every field ends up as `Result<T, ()>`.
fn reject(consts: &ConstTokens, path: &str, from: &syn::LitStr) -> TokenStream {
    let private_path = &consts.private_path;
    let errors_ident = &consts.errors_ident;

    quote! {
        |kind: #private_path::FieldErrorKind| {
            #errors_ident.push(#private_path::FieldError::new(#path, #from, kind));
        }
    }
}

fn parser_path(consts: &ConstTokens, path: Option<&ExprPath>) -> TokenStream {
    let private_path = &consts.private_path;

    if let Some(expr_path) = path {
        if let Some(ident) = expr_path.path.get_ident() {
            match ident.to_string().as_str() {
                "from_str" => return quote!(#private_path::from_str),
                "into" => return quote!(#private_path::into),
                "flag" => return quote!(#private_path::flag),
                "list" => return quote!(#private_path::list),
                _ => {}
            }
        }

        return quote!(#expr_path);
    }

    quote!(#private_path::from_str)
}
