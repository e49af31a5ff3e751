pub(crate) mod redirect_memo;
pub(crate) mod session_binding;
