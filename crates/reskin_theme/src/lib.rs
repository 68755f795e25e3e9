//! Reskin Theme Model
//!
//! Types describing a target brand's token library as the engine sees it.
//!
//! # Overview
//!
//! - [`Variable`] / [`VariableCollection`]: design tokens as stored by the document host
//! - [`Theme`] / [`CollectionBinding`]: one brand's collections, grouped by name
//! - [`ThemeIndex`]: `(collection, variable name) → Variable` lookup built once per run
//! - [`ThemeDepth`]: caller-selected scope of an apply run
//!
//! # Matching
//!
//! Themes from different libraries never share variable ids. Equivalent tokens are
//! found by collection name plus variable name:
//!
//! ```rust
//! use reskin_theme::{CollectionBinding, Theme, ThemeIndex, Variable, ResolvedType};
//!
//! let theme = Theme::new("Acme").with_collection(
//!     CollectionBinding::new("1.theme", "lib-key")
//!         .with_variables(vec![Variable::new("v:acme:1", "color/primary", ResolvedType::Color, "c:acme")]),
//! );
//!
//! let index = ThemeIndex::build(&theme);
//! assert_eq!(index.variable("1.theme", "color/primary").unwrap().id.as_str(), "v:acme:1");
//! ```

mod depth;
mod index;
mod theme;
mod variable;

pub use depth::ThemeDepth;
pub use index::{LookupError, ThemeIndex};
pub use theme::{CatalogError, CollectionBinding, Theme};
pub use variable::{
    AliasType, Mode, ResolvedType, Variable, VariableAlias, VariableCollection, VariableValue,
};
