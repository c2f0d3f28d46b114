//! Derive macros for the docsite configuration system.
//!
//! `#[derive(Configurable)]` generates three inherent methods on a struct
//! with named fields:
//!
//! - `apply_override(&mut self, key, value)` sets one field from a
//!   `KEY=VALUE` string pair
//! - `merge_fields(&mut self, other)` folds a later configuration layer in
//! - `config_keys()` lists every key `apply_override` accepts
//!
//! Field attributes:
//!
//! - `#[config(key = "name")]` overrides the key (defaults to the field name)
//! - `#[config(nested)]` delegates `name.sub` keys and merging to the field's
//!   own `Configurable` impl
//! - `#[config(skip)]` excludes the field from overrides; it is still merged
//!
//! The generated code refers to `crate::error::ConfigError`, which must have
//! a `Config(String)` variant.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
  Attribute,
  Data,
  DeriveInput,
  Fields,
  GenericArgument,
  Ident,
  PathArguments,
  Type,
  parse_macro_input,
};

/// Attribute configuration for a field.
#[derive(Default)]
struct FieldConfig {
  key:    Option<String>,
  nested: bool,
  skip:   bool,
}

impl FieldConfig {
  fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
    let mut config = Self::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("config")) {
      attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("key") {
          let lit: syn::LitStr = meta.value()?.parse()?;
          config.key = Some(lit.value());
        } else if meta.path.is_ident("nested") {
          config.nested = true;
        } else if meta.path.is_ident("skip") {
          config.skip = true;
        } else {
          return Err(meta.error("expected `key`, `nested` or `skip`"));
        }
        Ok(())
      })?;
    }

    Ok(config)
  }
}

/// Shape of a field type, as far as overriding and merging care.
enum FieldKind<'a> {
  Bool,
  Text,
  Path,
  Option(&'a Type),
  List(&'a Type),
  Map,
  Parsed,
}

impl<'a> FieldKind<'a> {
  fn of(ty: &'a Type) -> Self {
    let Some((ident, argument)) = last_segment(ty) else {
      return Self::Parsed;
    };

    match (ident.to_string().as_str(), argument) {
      ("bool", _) => Self::Bool,
      ("String", _) => Self::Text,
      ("PathBuf", _) => Self::Path,
      ("Option", Some(inner)) => Self::Option(inner),
      ("Vec", Some(inner)) => Self::List(inner),
      ("HashMap" | "BTreeMap", _) => Self::Map,
      _ => Self::Parsed,
    }
  }
}

/// Last path segment of `ty` and its first generic type argument, if any.
fn last_segment(ty: &Type) -> Option<(&Ident, Option<&Type>)> {
  let Type::Path(path) = ty else {
    return None;
  };
  let segment = path.path.segments.last()?;
  let argument = match &segment.arguments {
    PathArguments::AngleBracketed(args) => {
      args.args.iter().find_map(|arg| {
        match arg {
          GenericArgument::Type(ty) => Some(ty),
          _ => None,
        }
      })
    },
    _ => None,
  };
  Some((&segment.ident, argument))
}

/// Derive macro for configuration structs.
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as DeriveInput);
  expand(&input)
    .unwrap_or_else(syn::Error::into_compile_error)
    .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) =
    input.generics.split_for_impl();

  let Data::Struct(data) = &input.data else {
    return Err(syn::Error::new_spanned(
      input,
      "Configurable can only be derived for structs",
    ));
  };
  let Fields::Named(fields) = &data.fields else {
    return Err(syn::Error::new_spanned(
      input,
      "Configurable requires named fields",
    ));
  };

  let mut override_handlers = Vec::new();
  let mut merge_handlers = Vec::new();
  let mut key_collectors = Vec::new();

  for field in &fields.named {
    let config = FieldConfig::from_attrs(&field.attrs)?;
    let Some(field_name) = field.ident.as_ref() else {
      continue;
    };
    let key = config.key.clone().unwrap_or_else(|| field_name.to_string());
    let kind = FieldKind::of(&field.ty);

    merge_handlers.push(merge_handler(field_name, &kind, config.nested));
    if config.skip {
      continue;
    }

    if config.nested {
      let nested_ty = match &kind {
        FieldKind::Option(inner) => *inner,
        _ => &field.ty,
      };
      override_handlers.push(nested_override(field_name, &key, &kind));
      key_collectors.push(quote! {
        keys.extend(
          <#nested_ty>::config_keys()
            .into_iter()
            .map(|sub| format!("{}.{}", #key, sub)),
        );
      });
    } else if let Some(handler) =
      override_handler(field_name, &key, &field.ty, &kind)
    {
      override_handlers.push(handler);
      key_collectors.push(quote! { keys.push(#key.to_string()); });
    }
  }

  Ok(quote! {
    impl #impl_generics #name #ty_generics #where_clause {
      /// Apply a configuration override by key.
      ///
      /// # Errors
      ///
      /// Returns an error if the key is unknown or the value does not parse.
      pub fn apply_override(
        &mut self,
        key: &str,
        value: &str,
      ) -> std::result::Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        #(#override_handlers)*

        Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. Supported keys: {}",
          Self::config_keys().join(", "),
        )))
      }

      /// Merge another config into this one, `other` taking precedence.
      pub fn merge_fields(&mut self, other: Self) {
        #(#merge_handlers)*
      }

      /// Every key accepted by `apply_override`.
      #[must_use]
      pub fn config_keys() -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        #(#key_collectors)*
        keys
      }
    }
  })
}

fn nested_override(
  field_name: &Ident,
  key: &str,
  kind: &FieldKind<'_>,
) -> proc_macro2::TokenStream {
  let prefix = format!("{key}.");
  let target = if matches!(kind, FieldKind::Option(_)) {
    quote! { self.#field_name.get_or_insert_with(Default::default) }
  } else {
    quote! { self.#field_name }
  };

  quote! {
    if let Some(subkey) = key.strip_prefix(#prefix) {
      return #target.apply_override(subkey, value);
    }
  }
}

fn override_handler(
  field_name: &Ident,
  key: &str,
  ty: &Type,
  kind: &FieldKind<'_>,
) -> Option<proc_macro2::TokenStream> {
  let assignment = match kind {
    FieldKind::Map => return None,
    FieldKind::Bool => quote! { self.#field_name = parse_bool(value)?; },
    FieldKind::Text => quote! { self.#field_name = value.to_string(); },
    FieldKind::Path => {
      quote! { self.#field_name = std::path::PathBuf::from(value); }
    },
    FieldKind::Option(inner) => {
      let parse = parse_value(inner, quote! { value });
      quote! {
        self.#field_name = if value.is_empty() { None } else { Some(#parse) };
      }
    },
    FieldKind::List(inner) => {
      let parse = parse_value(inner, quote! { item });
      quote! {
        self.#field_name = value
          .split(',')
          .map(str::trim)
          .filter(|item| !item.is_empty())
          .map(|item| -> std::result::Result<_, ConfigError> { Ok(#parse) })
          .collect::<std::result::Result<Vec<_>, ConfigError>>()?;
      }
    },
    FieldKind::Parsed => {
      let parse = parse_value(ty, quote! { value });
      quote! { self.#field_name = #parse; }
    },
  };

  Some(quote! {
    if key == #key {
      #[allow(unused)]
      let parse_bool = |value: &str| -> std::result::Result<bool, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
          "true" | "yes" | "on" | "1" => Ok(true),
          "false" | "no" | "off" | "0" => Ok(false),
          _ => Err(ConfigError::Config(format!(
            "Invalid boolean value for '{}': '{}'. Expected true/false, yes/no, on/off or 1/0",
            #key, value
          ))),
        }
      };
      #[allow(unused)]
      let invalid = |value: &str, e: &dyn std::fmt::Display| {
        ConfigError::Config(format!(
          "Invalid value for '{}': '{}' - {}",
          #key, value, e
        ))
      };
      #assignment
      return Ok(());
    }
  })
}

/// Expression parsing the `&str` in `source` as `ty`, using `?` on failure.
fn parse_value(
  ty: &Type,
  source: proc_macro2::TokenStream,
) -> proc_macro2::TokenStream {
  match FieldKind::of(ty) {
    FieldKind::Bool => quote! { parse_bool(#source)? },
    FieldKind::Text => quote! { #source.to_string() },
    FieldKind::Path => quote! { std::path::PathBuf::from(#source) },
    _ => {
      quote! {
        #source.parse::<#ty>().map_err(|e| invalid(#source, &e))?
      }
    },
  }
}

fn merge_handler(
  field_name: &Ident,
  kind: &FieldKind<'_>,
  nested: bool,
) -> proc_macro2::TokenStream {
  match kind {
    FieldKind::Option(_) if nested => {
      quote! {
        match (self.#field_name.as_mut(), other.#field_name) {
          (Some(inner), Some(other_inner)) => inner.merge_fields(other_inner),
          (None, Some(other_inner)) => self.#field_name = Some(other_inner),
          _ => {},
        }
      }
    },
    _ if nested => {
      quote! { self.#field_name.merge_fields(other.#field_name); }
    },
    FieldKind::Option(_) => {
      quote! {
        if other.#field_name.is_some() {
          self.#field_name = other.#field_name;
        }
      }
    },
    FieldKind::List(_) | FieldKind::Map => {
      quote! { self.#field_name.extend(other.#field_name); }
    },
    FieldKind::Bool
    | FieldKind::Text
    | FieldKind::Path
    | FieldKind::Parsed => {
      quote! { self.#field_name = other.#field_name; }
    },
  }
}
