pub mod compression;
pub mod ignore;
