use std::collections::BTreeSet;

use proc_macro2::TokenStream;
use quote::quote;

use super::naming::{member_ident, type_ident};
use super::sql_type::{field_type, host_type_path};
use super::{CodeTarget, TypeGenerator, TypeKind};
use crate::error::SqlTypegenError;
use crate::results::ColumnDescriptor;

/// Emits a row record with one `Option<T>` field per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleTypeGenerator {
    class_name: String,
    columns: Vec<ColumnDescriptor>,
}

impl TupleTypeGenerator {
    #[must_use]
    pub fn new(class_name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            class_name: class_name.into(),
            columns,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }
}

impl TypeGenerator for TupleTypeGenerator {
    const KIND: TypeKind = TypeKind::Tuple;

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn tokens(&self, target: &CodeTarget) -> Result<TokenStream, SqlTypegenError> {
        if self.columns.is_empty() {
            return Err(SqlTypegenError::GenerationError(format!(
                "{} has no columns",
                self.class_name
            )));
        }
        let rt = target.runtime();
        let class = type_ident(&self.class_name)?;
        let name = &self.class_name;

        let mut seen = BTreeSet::new();
        let mut fields = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let field = member_ident(&column.name);
            if !seen.insert(field.to_string()) {
                return Err(SqlTypegenError::GenerationError(format!(
                    "columns of {name} map to the same field '{field}'; alias them in the SQL"
                )));
            }
            fields.push(field);
        }

        let field_types = self.columns.iter().map(|c| field_type(c.host_type, rt));
        let column_names = self.columns.iter().map(|c| c.name.as_ref());
        let host_types = self.columns.iter().map(|c| host_type_path(c.host_type, rt));
        let indices: Vec<usize> = (0..self.columns.len()).collect();
        let doc = format!(
            "Row of {} column(s): {}.",
            self.columns.len(),
            self.columns
                .iter()
                .map(|c| format!("`{}` {}", c.name, c.host_type))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(quote! {
            #[doc = #doc]
            #[derive(Debug, Clone, Default, PartialEq)]
            pub struct #class {
                #(pub #fields: #field_types,)*
            }

            impl #class {
                pub const COLUMNS: &'static [#rt::ColumnDescriptor] = &[
                    #(#rt::ColumnDescriptor::new(#column_names, #host_types),)*
                ];
            }

            impl #rt::Tuple for #class {
                const NAME: &'static str = #name;

                fn column_descriptors() -> &'static [#rt::ColumnDescriptor] {
                    Self::COLUMNS
                }

                fn set_field(
                    &mut self,
                    index: usize,
                    value: #rt::DbValue,
                ) -> Result<(), #rt::SqlTypegenError> {
                    match index {
                        #(#indices => self.#fields = #rt::DbScalar::decode(value)?,)*
                        _ => return Err(<Self as #rt::Tuple>::no_such_field(index)),
                    }
                    Ok(())
                }

                fn field(&self, index: usize) -> Option<#rt::DbValue> {
                    match index {
                        #(#indices => Some(#rt::DbScalar::encode(self.#fields.clone())),)*
                        _ => None,
                    }
                }
            }

            impl ::std::fmt::Display for #class {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    #rt::display_tuple(self, f)
                }
            }
        })
    }
}
