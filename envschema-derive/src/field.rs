use darling::FromField;
use syn::{
    ExprPath, Field, GenericArgument, Ident, LitStr, Meta, PathArguments, Token, Type,
    ext::IdentExt,
};

pub enum EnvAttribute {
    /// #[env(nested)]
    Nested,
    /// #[env(from = "...", default = "...", with = ...)], #[env(from)] or no
    /// attribute at all.
    Flat {
        from: LitStr,
        default: Option<LitStr>,
        with: Option<ExprPath>,
    },
}

pub struct EnvSchemaFieldReceiver {
    pub ident: Ident,
    pub ty: Type,
    /// Inner type when the field is `Option<T>`.
    pub option: Option<Type>,
    pub env_attr: EnvAttribute,
}

#[derive(Default)]
struct Attrs {
    /// `from` was written, with or without a name.
    has_from: bool,
    from: Option<LitStr>,
    default: Option<LitStr>,
    with: Option<ExprPath>,
    nested: bool,
}

impl FromField for EnvSchemaFieldReceiver {
    fn from_field(field: &Field) -> darling::Result<Self> {
        let ident = field.ident.clone().ok_or_else(|| {
            darling::Error::custom("EnvSchema derive only supports named fields").with_span(field)
        })?;
        let ty = field.ty.clone();
        let option = option_inner(&ty).cloned();

        let mut attrs = Attrs::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("env") || matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("from") {
                    attrs.has_from = true;
                    if meta.input.peek(Token![=]) {
                        attrs.from = Some(meta.value()?.parse()?);
                    }
                } else if meta.path.is_ident("default") {
                    attrs.default = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("with") {
                    attrs.with = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("nested") {
                    if !meta.input.is_empty() && !meta.input.peek(Token![,]) {
                        return Err(meta.error("expected `nested` without a value"));
                    }
                    attrs.nested = true;
                } else {
                    return Err(meta.error("unsupported env attribute"));
                }

                Ok(())
            })?;
        }

        if option.is_some() && attrs.default.is_some() {
            return Err(
                darling::Error::custom("Optional fields cannot have a default").with_span(field),
            );
        }

        let env_attr = match attrs {
            Attrs {
                nested: true,
                has_from: false,
                default: None,
                with: None,
                ..
            } => EnvAttribute::Nested,
            Attrs { nested: true, .. } => {
                return Err(darling::Error::custom(
                    "nested must not be used with other attributes",
                )
                .with_span(field));
            }
            Attrs {
                from,
                default,
                with,
                nested: false,
                ..
            } => EnvAttribute::Flat {
                from: from.unwrap_or_else(|| {
                    LitStr::new(&ident.unraw().to_string().to_uppercase(), ident.span())
                }),
                default,
                with,
            },
        };

        Ok(Self {
            ident,
            ty,
            option,
            env_attr,
        })
    }
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(generic_args) = &segment.arguments else {
        return None;
    };

    match generic_args.args.first() {
        Some(GenericArgument::Type(inner)) if generic_args.args.len() == 1 => Some(inner),
        _ => None,
    }
}
