//! Rendering of tuple, query, update, value-of and facade types as Rust source.
//!
//! Every generator builds a token stream, renders it through `prettyplease`
//! and writes one file per type under `{output_dir}/{package path}/`. Output
//! depends only on the generator's inputs, so regenerating from unchanged
//! inputs leaves files byte-identical (and untouched on disk).

pub mod facade;
pub mod naming;
pub mod query;
pub(crate) mod sql_type;
pub mod tuple;
pub mod update;
pub mod value_of;
pub mod writer;

use std::collections::BTreeSet;
use std::path::PathBuf;

use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

use crate::error::SqlTypegenError;
use crate::types::HostType;

pub use facade::FacadeGenerator;
pub use query::QueryTypeGenerator;
pub use tuple::TupleTypeGenerator;
pub use update::UpdateTypeGenerator;
pub use value_of::ValueOfTypeGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    Tuple,
    Query,
    Update,
    ValueOf,
    Facade,
}

/// A type written by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedType {
    pub kind: TypeKind,
    pub class_name: String,
    pub package_name: String,
    pub source_text: String,
    pub source_file: PathBuf,
}

/// A named, typed statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub host_type: HostType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodReturn {
    Tuples { tuple: String },
    UpdatableTuples { tuple: String },
    RowCount,
    Value(HostType),
}

/// Signature of one facade method and the generated function it delegates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub qualifier: String,
    pub parameters: Vec<Parameter>,
    pub returns: MethodReturn,
    pub delegate_type: String,
    pub delegate_fn: String,
}

/// Where generated files go and how they refer to the runtime crate.
#[derive(Debug, Clone)]
pub struct CodeTarget {
    output_dir: PathBuf,
    package: String,
    runtime: syn::Path,
}

impl CodeTarget {
    /// # Errors
    /// Returns `SqlTypegenError::ConfigError` if `package` or `runtime_crate` is not a module path.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        package: &str,
        runtime_crate: &str,
    ) -> Result<Self, SqlTypegenError> {
        if !package.is_empty() {
            syn::parse_str::<syn::Path>(package).map_err(|e| {
                SqlTypegenError::ConfigError(format!("invalid package '{package}': {e}"))
            })?;
        }
        let runtime = syn::parse_str::<syn::Path>(runtime_crate).map_err(|e| {
            SqlTypegenError::ConfigError(format!("invalid runtime crate path '{runtime_crate}': {e}"))
        })?;
        Ok(Self {
            output_dir: output_dir.into(),
            package: package.to_string(),
            runtime,
        })
    }

    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    #[must_use]
    pub fn runtime(&self) -> &syn::Path {
        &self.runtime
    }

    /// `{output_dir}/{package path}`
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.package
            .split("::")
            .filter(|segment| !segment.is_empty())
            .fold(self.output_dir.clone(), |dir, segment| dir.join(segment))
    }

    /// Module name of a generated type: `OrdersTuple` => `orders_tuple`.
    #[must_use]
    pub fn file_stem(class_name: &str) -> String {
        naming::member_ident(class_name).to_string()
    }

    #[must_use]
    pub fn source_file(&self, class_name: &str) -> PathBuf {
        self.package_dir()
            .join(format!("{}.rs", Self::file_stem(class_name)))
    }
}

/// Shared behaviour of the type generators.
pub trait TypeGenerator {
    const KIND: TypeKind;

    fn class_name(&self) -> &str;

    /// Items of the generated file.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::GenerationError` if a name cannot be expressed in Rust.
    fn tokens(&self, target: &CodeTarget) -> Result<TokenStream, SqlTypegenError>;

    /// # Errors
    /// See [`TypeGenerator::tokens`].
    fn source_text(&self, target: &CodeTarget) -> Result<String, SqlTypegenError> {
        writer::render(self.tokens(target)?)
    }

    /// Render and write the type's file.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if rendering or writing fails.
    fn generate(&self, target: &CodeTarget) -> Result<GeneratedType, SqlTypegenError> {
        let source_text = self.source_text(target)?;
        let source_file = target.source_file(self.class_name());
        writer::write_if_changed(&source_file, &source_text)?;
        Ok(GeneratedType {
            kind: Self::KIND,
            class_name: self.class_name().to_string(),
            package_name: target.package().to_string(),
            source_text,
            source_file,
        })
    }

    /// Delete the type's file; `Ok(false)` if it was never generated.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::IoError` if the file exists but cannot be removed.
    fn destroy(&self, target: &CodeTarget) -> Result<bool, SqlTypegenError> {
        destroy_type(target, self.class_name())
    }
}

/// Delete the generated file for `class_name`; `Ok(false)` if there is none.
///
/// # Errors
/// Returns `SqlTypegenError::IoError` if the file exists but cannot be removed.
pub fn destroy_type(target: &CodeTarget, class_name: &str) -> Result<bool, SqlTypegenError> {
    writer::remove(&target.source_file(class_name))
}

/// Names that generated functions already use for their leading arguments.
const RESERVED_PARAMETERS: &[&str] = &["database", "xact", "self_"];

/// Parameter identifiers plus their declarations (`name: Type`).
pub(crate) fn parameter_tokens(
    parameters: &[Parameter],
    runtime: &syn::Path,
) -> Result<(Vec<Ident>, Vec<TokenStream>), SqlTypegenError> {
    let mut seen = BTreeSet::new();
    let mut idents = Vec::with_capacity(parameters.len());
    let mut decls = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let mut ident = naming::member_ident(&parameter.name);
        if RESERVED_PARAMETERS.contains(&ident.to_string().as_str()) {
            ident = naming::new_id(&format!("{ident}_"));
        }
        if !seen.insert(ident.to_string()) {
            return Err(SqlTypegenError::GenerationError(format!(
                "parameters map to the same identifier '{ident}'"
            )));
        }
        let ty = sql_type::param_type(parameter.host_type, runtime);
        decls.push(quote!(#ident: #ty));
        idents.push(ident);
    }
    Ok((idents, decls))
}

/// `pub const SQL`, the argument-holding struct and its `Statement` impl, shared by
/// query, update and value-of types.
pub(crate) fn statement_tokens(
    class: &Ident,
    doc: &str,
    sql: &str,
    idents: &[Ident],
    decls: &[TokenStream],
    runtime: &syn::Path,
) -> TokenStream {
    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        pub struct #class {
            arguments: Vec<#runtime::DbValue>,
        }

        impl #class {
            pub const SQL: &'static str = #sql;

            #[must_use]
            pub fn new(#(#decls),*) -> Self {
                Self {
                    arguments: vec![#(#runtime::DbValue::from(#idents)),*],
                }
            }
        }

        impl #runtime::Statement for #class {
            fn sql(&self) -> &str {
                Self::SQL
            }

            fn arguments(&self) -> &[#runtime::DbValue] {
                &self.arguments
            }
        }
    }
}
