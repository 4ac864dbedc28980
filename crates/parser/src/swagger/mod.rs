//! Swagger 2.0 resource analysis
//!
//! Derives CRUD resource descriptors from Swagger 2.0 documents written for
//! Terraform providers.
//!
//! ## Resource convention
//! - Root path (`/v1/cdns`) exposes POST with a single body parameter whose
//!   `$ref` points at the payload definition
//! - Instance path (`/v1/cdns/{id}`) exposes GET, optionally PUT and DELETE
//! - The payload definition has an `id` property or one flagged `x-terraform-id`
//! - Sub-resources nest under a parent instance path
//!   (`/v1/cdns/{cdn_id}/v1/firewalls`)
//!
//! ## Usage
//! ```rust,ignore
//! use openapi_resource_analyzer_parser::swagger::SwaggerParser;
//!
//! let parser = SwaggerParser::from_file("cdn-service.yaml")?;
//! for resource in parser.parse()? {
//!     println!("{}", resource.name);
//! }
//! ```

mod converter;
mod extensions;
mod parser;
mod regions;
mod types;

pub use converter::convert_swagger_to_resources;
pub use extensions::*;
pub use parser::{FileSpecSource, SpecSource, SwaggerParser};
pub use regions::RegionHostTemplate;
pub use types::*;
