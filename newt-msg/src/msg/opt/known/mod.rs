/// Content-Format values
pub mod content_format;
pub use content_format::*;

/// Block1 & Block2 option values
pub mod block;
pub use block::*;

/// Observe option values
pub mod observe;

macro_rules! opt {
  (#[doc = $doc:expr] $name:ident = $n:literal) => {
    #[doc = $doc]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: crate::OptNumber = crate::OptNumber($n);
  };
}

opt!(#[doc = "If-Match (repeatable, RFC7252 5.10.8.1)"]
     IF_MATCH = 1);
opt!(#[doc = "Uri-Host (RFC7252 5.10.1)"]
     URI_HOST = 3);
opt!(#[doc = "ETag (repeatable, RFC7252 5.10.6)"]
     ETAG = 4);
opt!(#[doc = "If-None-Match (RFC7252 5.10.8.2)"]
     IF_NONE_MATCH = 5);
opt!(#[doc = "Observe (RFC7641 2); see [`observe::Action`]"]
     OBSERVE = 6);
opt!(#[doc = "Uri-Port (RFC7252 5.10.1)"]
     URI_PORT = 7);
opt!(#[doc = "Location-Path (repeatable, RFC7252 5.10.7)"]
     LOCATION_PATH = 8);
opt!(#[doc = "Uri-Path (repeatable, RFC7252 5.10.1); one option per path segment"]
     URI_PATH = 11);
opt!(#[doc = "Content-Format (RFC7252 5.10.3); see [`ContentFormat`]"]
     CONTENT_FORMAT = 12);
opt!(#[doc = "Max-Age (RFC7252 5.10.5)"]
     MAX_AGE = 14);
opt!(#[doc = "Uri-Query (repeatable, RFC7252 5.10.1); one option per `name=value` pair"]
     URI_QUERY = 15);
opt!(#[doc = "Accept (RFC7252 5.10.4)"]
     ACCEPT = 17);
opt!(#[doc = "Location-Query (repeatable, RFC7252 5.10.7)"]
     LOCATION_QUERY = 20);
opt!(#[doc = "Block2 (RFC7959 2.1); see [`Block`]"]
     BLOCK2 = 23);
opt!(#[doc = "Block1 (RFC7959 2.1); see [`Block`]"]
     BLOCK1 = 27);
opt!(#[doc = "Size2 (RFC7959 4)"]
     SIZE2 = 28);
opt!(#[doc = "Proxy-Uri (RFC7252 5.10.2)"]
     PROXY_URI = 35);
opt!(#[doc = "Proxy-Scheme (RFC7252 5.10.2)"]
     PROXY_SCHEME = 39);
opt!(#[doc = "Size1 (RFC7252 5.10.9)"]
     SIZE1 = 60);
opt!(#[doc = "No-Response (RFC7967 2); a bitmask of response classes the client is not interested in"]
     NO_RESPONSE = 258);

/// Every option number in this module, in ascending order
pub const ALL: [crate::OptNumber; 20] = [IF_MATCH,
                                         URI_HOST,
                                         ETAG,
                                         IF_NONE_MATCH,
                                         OBSERVE,
                                         URI_PORT,
                                         LOCATION_PATH,
                                         URI_PATH,
                                         CONTENT_FORMAT,
                                         MAX_AGE,
                                         URI_QUERY,
                                         ACCEPT,
                                         LOCATION_QUERY,
                                         BLOCK2,
                                         BLOCK1,
                                         SIZE2,
                                         PROXY_URI,
                                         PROXY_SCHEME,
                                         SIZE1,
                                         NO_RESPONSE];
