pub mod identifier;
pub mod manager;
pub mod memory;
pub mod mongo;
pub mod store;

pub use identifier::{GradeId, IdentifierError};
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryGradeStore;
pub use mongo::MongoGradeStore;
pub use store::{DeleteAck, DynGradeStore, GradeStore, InsertAck, StoreError, UpdateAck, PAGE_SIZE};
