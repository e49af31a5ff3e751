//! Response bodies returned by the login endpoints.

pub(crate) mod callback_error;
