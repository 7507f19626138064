use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

use super::naming::new_id;
use crate::types::HostType;

/// Rust type a non-NULL value of `host_type` decodes into.
pub(crate) fn scalar_type(host_type: HostType, runtime: &Path) -> TokenStream {
    match host_type {
        HostType::Bool => quote!(bool),
        HostType::Int32 => quote!(i32),
        HostType::Int64 => quote!(i64),
        HostType::Float64 => quote!(f64),
        HostType::Text => quote!(String),
        HostType::Blob => quote!(Vec<u8>),
        HostType::Date => quote!(#runtime::chrono::NaiveDate),
        HostType::Timestamp => quote!(#runtime::chrono::NaiveDateTime),
        HostType::Json => quote!(#runtime::serde_json::Value),
        HostType::Any => quote!(#runtime::DbValue),
    }
}

/// Tuple field type; NULL is `None`.
pub(crate) fn field_type(host_type: HostType, runtime: &Path) -> TokenStream {
    let scalar = scalar_type(host_type, runtime);
    quote!(Option<#scalar>)
}

/// Parameter type in generated signatures.
pub(crate) fn param_type(host_type: HostType, runtime: &Path) -> TokenStream {
    match host_type {
        HostType::Text => quote!(&str),
        other => scalar_type(other, runtime),
    }
}

pub(crate) fn host_type_path(host_type: HostType, runtime: &Path) -> TokenStream {
    let variant = new_id(host_type.variant_name());
    quote!(#runtime::HostType::#variant)
}
