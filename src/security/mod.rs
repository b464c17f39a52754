mod path_guard;
mod url_guard;

pub use path_guard::PathGuard;
pub use url_guard::{is_blocked_host_literal, is_blocked_ip, HostResolver, SystemResolver, UrlGuard};
