//! # Happiness Core
//!
//! Offline record store for a personal happiness journal. Each entry carries a
//! short text, an emotion tag, an optional image reference, a like counter and
//! a list of comments. The whole collection lives in one LMDB-backed slot and is
//! rewritten on every change, and the store keeps a "continuous days" streak
//! derived from the entries' creation dates.
//!
//! The Rust API lives in [`happiness_store::HappinessStore`]. This file exposes
//! the same operations over a C ABI for mobile front ends: requests and replies
//! are JSON, and every reply is an [`AppResponse`] envelope.
//!
//! ## FFI Functions
//!
//! - [`create_store`] - Open the journal stored under a base name
//! - [`get_snapshot`] - Records, loading flag, last error and streak
//! - [`add_record`] / [`get_record`] / [`delete_record`]
//! - [`add_comment`] / [`like_record`]
//! - [`get_recent_records`] - Newest first, optionally for one emotion
//! - [`get_display_name`] / [`set_display_name`]
//! - [`subscribe_snapshots`] / [`unsubscribe_snapshots`]
//! - [`reset_store`] - Wipe saved data; the host restarts afterwards
//! - [`close_store`] - Sync and release the store
//! - [`free_c_string`] - Release any string returned by this library

pub mod app_response;
pub mod clock;
pub mod config;
pub mod durable_slot;
pub mod error;
pub mod happiness_model;
pub mod happiness_store;
pub mod local_db_state;
pub mod streak;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

pub use crate::app_response::AppResponse;
use crate::clock::SystemClock;
use crate::config::StoreConfig;
use crate::happiness_model::{Emotion, NewComment, NewRecord};
use crate::happiness_store::{HappinessStore, SubscriptionId, RECENT_LIMIT};
use crate::local_db_state::AppDbState;

/// Store type handed across the FFI boundary.
pub type AppStore = HappinessStore<AppDbState, SystemClock>;

/// Opens the journal stored in `<name>.lmdb`, creating it if needed.
///
/// Returns a null pointer if `name` is null, not UTF-8, or the environment
/// cannot be opened. Release the store with [`close_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut AppStore {
    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = StoreConfig::named(name_str);
    match AppDbState::init(&config) {
        Ok(db) => {
            let store = HappinessStore::open(db, SystemClock, config);
            info!("✅ Happiness store opened with {} records", store.total_records());
            Box::into_raw(Box::new(store))
        }
        Err(e) => {
            warn!("❌ Failed to open happiness store: {e}");
            warn!("Attempted path: {}", config.lmdb_dir().display());
            std::ptr::null_mut()
        }
    }
}

/// Returns the current snapshot as `{records, loading, error, streak}`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_snapshot(state: *mut AppStore) -> *const c_char {
    let store = match store_from_ptr(state, "get_snapshot") {
        Ok(s) => s,
        Err(err) => return err,
    };

    json_response(&store.snapshot())
}

/// Adds a record described by `{"text", "emotion", "imageUrl"?}`.
///
/// Replies with the stored record, including its assigned id and timestamp.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_record(state: *mut AppStore, json_ptr: *const c_char) -> *const c_char {
    let store = match store_from_ptr(state, "add_record") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let draft: NewRecord = match serde_json::from_str(&json_str) {
        Ok(d) => d,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    if store.is_retired() {
        return retired_response();
    }

    match store.add_record(draft) {
        Some(record) => json_response(&record),
        None => mutation_failure(store),
    }
}

/// Looks a record up by id.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_record(state: *mut AppStore, id: *const c_char) -> *const c_char {
    let store = match store_from_ptr(state, "get_record") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match store.get_record(&id_str) {
        Some(record) => json_response(record),
        None => {
            let error = AppResponse::NotFound(format!("No record found with id: {id_str}"));
            response_to_c_string(&error)
        }
    }
}

/// Adds a comment from `{"recordId", "text", "author"}`.
///
/// An unknown `recordId` is not an error: the reply is `Ok` and nothing
/// changes.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_comment(state: *mut AppStore, json_ptr: *const c_char) -> *const c_char {
    let store = match store_from_ptr(state, "add_comment") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let request: NewComment = match serde_json::from_str(&json_str) {
        Ok(r) => r,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    if store.is_retired() {
        return retired_response();
    }

    match store.add_comment(&request.record_id, &request.text, &request.author) {
        Some(comment) => json_response(&comment),
        None if store.error().is_some() => mutation_failure(store),
        None => {
            let msg = format!("No record with id {}; nothing changed", request.record_id);
            response_to_c_string(&AppResponse::success(msg))
        }
    }
}

/// Adds one like to a record. Unknown ids are a silent no-op.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn like_record(state: *mut AppStore, id: *const c_char) -> *const c_char {
    let store = match store_from_ptr(state, "like_record") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    if store.is_retired() {
        return retired_response();
    }

    if !store.like_record(&id_str) {
        return mutation_failure(store);
    }

    let likes = store.get_record(&id_str).map_or(0, |r| r.likes);
    response_to_c_string(&AppResponse::success(likes.to_string()))
}

/// Deletes a record. Unknown ids are a silent no-op.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_record(state: *mut AppStore, id: *const c_char) -> *const c_char {
    let store = match store_from_ptr(state, "delete_record") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    if store.is_retired() {
        return retired_response();
    }

    store.delete_record(&id_str);
    if store.error().is_some() {
        return mutation_failure(store);
    }

    response_to_c_string(&AppResponse::success(format!("Record {id_str} deleted")))
}

/// Lists the [`RECENT_LIMIT`] newest records. `emotion` may be null to
/// include every emotion.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_recent_records(
    state: *mut AppStore,
    emotion: *const c_char,
) -> *const c_char {
    let store = match store_from_ptr(state, "get_recent_records") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let filter = if emotion.is_null() {
        None
    } else {
        let raw = match c_ptr_to_string(emotion, "emotion") {
            Ok(e) => e,
            Err(err) => return err,
        };
        match Emotion::parse(&raw) {
            Some(e) => Some(e),
            None => {
                let error = AppResponse::ValidationError(format!("Unknown emotion: {raw}"));
                return response_to_c_string(&error);
            }
        }
    };

    json_response(&store.recent_records(filter, RECENT_LIMIT))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_display_name(state: *mut AppStore) -> *const c_char {
    let store = match store_from_ptr(state, "get_display_name") {
        Ok(s) => s,
        Err(err) => return err,
    };

    response_to_c_string(&AppResponse::success(store.display_name()))
}

/// Saves the profile display name. Blank names are rejected.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_display_name(state: *mut AppStore, name: *const c_char) -> *const c_char {
    let store = match store_from_ptr(state, "set_display_name") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let name_str = match c_ptr_to_string(name, "name") {
        Ok(n) => n,
        Err(err) => return err,
    };

    if name_str.trim().is_empty() {
        let error = AppResponse::ValidationError("Display name must not be blank".to_string());
        return response_to_c_string(&error);
    }

    if store.is_retired() {
        return retired_response();
    }

    if store.set_display_name(&name_str) {
        response_to_c_string(&AppResponse::success(name_str))
    } else {
        mutation_failure(store)
    }
}

/// Callback receiving each new snapshot as a JSON C string.
///
/// The string is only valid for the duration of the call; copy it if needed.
/// The callback runs while the store is in the middle of a mutation, so it
/// must not call any function of this library with the same store pointer.
/// Hand the JSON to the UI and return.
pub type SnapshotCallback = extern "C" fn(*const c_char);

/// Registers `callback` for snapshot changes. Replies with the subscription id.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn subscribe_snapshots(
    state: *mut AppStore,
    callback: SnapshotCallback,
) -> *const c_char {
    let store = match store_from_ptr(state, "subscribe_snapshots") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id = store.subscribe(move |snapshot| {
        let json = match serde_json::to_string(snapshot) {
            Ok(j) => j,
            Err(e) => {
                warn!("Error serializing snapshot for subscriber: {e}");
                return;
            }
        };
        match CString::new(json) {
            Ok(c_str) => callback(c_str.as_ptr()),
            Err(e) => warn!("Error creating CString for subscriber: {e}"),
        }
    });

    response_to_c_string(&AppResponse::success(id.to_string()))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn unsubscribe_snapshots(state: *mut AppStore, id: SubscriptionId) -> *const c_char {
    let store = match store_from_ptr(state, "unsubscribe_snapshots") {
        Ok(s) => s,
        Err(err) => return err,
    };

    if store.unsubscribe(id) {
        response_to_c_string(&AppResponse::success(format!("Subscription {id} removed")))
    } else {
        response_to_c_string(&AppResponse::NotFound(format!("No subscription with id: {id}")))
    }
}

/// Clears all saved data. The store refuses further changes; the host should
/// call [`close_store`] and [`create_store`] again, as it would after restarting.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reset_store(state: *mut AppStore) -> *const c_char {
    let store = match store_from_ptr(state, "reset_store") {
        Ok(s) => s,
        Err(err) => return err,
    };

    if store.reset() {
        response_to_c_string(&AppResponse::success("Saved data cleared; restart required"))
    } else {
        mutation_failure(store)
    }
}

/// Syncs and releases the store. `state` must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut AppStore) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_store".to_string());
        return response_to_c_string(&error);
    }

    let store = unsafe { Box::from_raw(state) };
    let mut db = store.into_slot();

    match db.close_database() {
        Ok(()) => response_to_c_string(&AppResponse::success("Store closed successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Frees a string previously returned by this library. Null is ignored.
#[no_mangle]
pub extern "C" fn free_c_string(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn store_from_ptr<'a>(
    state: *mut AppStore,
    fn_name: &str,
) -> Result<&'a mut AppStore, *const c_char> {
    match unsafe { state.as_mut() } {
        Some(s) => Ok(s),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn json_response<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Failed to serialize result: {e}"));
            response_to_c_string(&error)
        }
    }
}

fn mutation_failure(store: &AppStore) -> *const c_char {
    let msg = store.error().unwrap_or("Unknown storage failure").to_string();
    response_to_c_string(&AppResponse::DatabaseError(msg))
}

fn retired_response() -> *const c_char {
    let error = AppResponse::from(crate::error::StoreError::Retired);
    response_to_c_string(&error)
}

/// Serializes an [`AppResponse`] into a C string owned by the caller.
///
/// Returns null if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string argument, replying with `BadRequest` on null or bad UTF-8.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
