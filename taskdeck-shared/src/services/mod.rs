/// Business operations
///
/// - [`credentials`]: registration and password login
/// - [`repository`]: owner-scoped task CRUD
/// - [`lifecycle`]: status changes
/// - [`access`]: auth-context checks in front of the repository and lifecycle
///
/// All services hold their storage as `Arc<dyn ...Store>` and are cheap to
/// clone into request handlers.

pub mod access;
pub mod credentials;
pub mod lifecycle;
pub mod repository;

pub use access::TaskService;
pub use credentials::{AuthSession, CredentialService, RegisterInput};
pub use lifecycle::TaskLifecycle;
pub use repository::TaskRepository;
