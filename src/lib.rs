// This is free and unencumbered software released into the public domain.

//! Client for the CGI parameter interface of Vivotek network cameras.

pub mod cli;
pub mod shared;
