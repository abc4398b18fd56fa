//! Credential lifecycle and authorization gating for Collabgate.
//!
//! Two paths lead into a document: REST calls and navigation. Both must
//! agree on whether the user is signed in, so both read the same
//! [`AuthContext`]:
//!
//! 1. **Auth Store**: logs in, registers, logs out and refreshes the cached
//!    profile ([`AuthStore`])
//! 2. **Request Gateway**: wraps every REST call, injects the bearer token
//!    and turns a 401 into a global sign-out ([`RequestGateway`])
//! 3. **Route Guard**: decides, before each navigation, whether the
//!    destination may be entered ([`RouteGuard`])
//!
//! Only the store and the gateway can write the context. Everything else
//! reads it.
//!
//! # Feature Flags
//!
//! - `http` (default): [`ReqwestClient`], an [`HttpClient`] backed by
//!   `reqwest`

mod api;
mod context;
mod error;
mod gateway;
mod guard;
mod http;
#[cfg(feature = "http")]
mod reqwest_client;
mod storage;
mod store;
mod token;
mod types;

pub use api::{AuthApi, FilesApi};
pub use context::AuthContext;
pub use error::{ApiError, AuthError, NetworkError, StorageError};
pub use gateway::{Redirect, RequestGateway};
pub use guard::{GuardDecision, Navigation, RouteGuard, RouteMeta, RouteTable, SHARE_TOKEN_PARAM};
pub use http::{ApiRequest, ApiResponse, HttpClient, Method, RequestBody};
#[cfg(feature = "http")]
pub use reqwest_client::ReqwestClient;
pub use storage::{FileTokenStorage, MemoryTokenStorage, TOKEN_KEY, TokenStorage};
pub use store::AuthStore;
pub use token::{ShareToken, Token};
pub use types::{AccessToken, FileRecord, FileUpdate, NewFile, NewUser, PublicFile, ShareGrant, UserProfile};
