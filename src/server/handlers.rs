use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::wire::{
    CreateRequest, EntryReply, MessageReply, OpenReply, OpenRequest, PathQuery, RemoveQuery,
    SetAttrRequest,
};
use super::AppState;
use crate::store::entry::{Entry, FileKind};
use crate::store::{parse_ino, Snapshot};

type ApiResult<T> = Result<T, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn resolve_inode(
    State(state): State<AppState>,
    raw: Result<Path<String>, PathRejection>,
) -> ApiResult<String> {
    let Path(raw) = raw?;
    debug!("resolve-inode({})", raw);
    let ino = parse_ino(&raw).inspect_err(|e| warn!("resolve-inode({}): {}", raw, e))?;
    let path = state
        .store
        .resolve_inode(ino)
        .inspect_err(|e| debug!("resolve-inode({}): {}", ino, e))?;
    debug!("inode {} -> {}", ino, path);
    Ok(path)
}

pub async fn get_metadata(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> ApiResult<Json<Entry>> {
    let Query(q) = query?;
    debug!("metadata(path={:?})", q.path);
    let entry = state
        .store
        .get_metadata(q.path())
        .inspect_err(|e| debug!("metadata: {}", e))?;
    debug!(
        "metadata for {}: ino={}, type={}",
        entry.path, entry.ino, entry.kind
    );
    Ok(Json(entry))
}

pub async fn set_metadata(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
    body: Result<Json<SetAttrRequest>, JsonRejection>,
) -> ApiResult<Json<EntryReply>> {
    let Query(q) = query?;
    let Json(req) = body?;
    debug!("setattr(path={:?}, {:?})", q.path, req);
    if let Some(flags) = req.flags {
        debug!("setattr: ignoring flags {:#x}", flags);
    }
    let entry = state
        .store
        .set_attributes(q.path(), req.into())
        .inspect_err(|e| warn!("setattr: {}", e))?;
    info!("Updated attributes of {} (ino {})", entry.path, entry.ino);
    Ok(Json(entry.into()))
}

pub async fn list_directory(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Entry>>> {
    let Query(q) = query?;
    debug!("list(path={:?})", q.path);
    let entries = state
        .store
        .list_directory(q.path())
        .inspect_err(|e| debug!("list: {}", e))?;
    Ok(Json(entries))
}

pub async fn debug_files(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.store.snapshot())
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EntryReply>)> {
    let Json(req) = body?;
    debug!("create({:?})", req);
    if let Some(rdev) = req.rdev.filter(|r| *r != 0) {
        debug!("create: device numbers are not modeled, ignoring rdev {}", rdev);
    }
    let new = req.into_new_entry()?;
    let entry = state
        .store
        .create_entry(new)
        .inspect_err(|e| warn!("create: {}", e))?;
    info!("Created {} {} (ino {})", entry.kind, entry.path, entry.ino);
    Ok((StatusCode::CREATED, Json(entry.into())))
}

pub async fn remove(
    State(state): State<AppState>,
    query: Result<Query<RemoveQuery>, QueryRejection>,
) -> ApiResult<Json<MessageReply>> {
    let Query(q) = query?;
    let expected = q.expected_kind();
    let path = q.path.as_deref().unwrap_or_default();
    debug!("remove(path={:?}, expected={})", q.path, expected);
    let entry = state
        .store
        .remove_entry(path, expected)
        .inspect_err(|e| warn!("remove: {}", e))?;
    info!("Removed {} (ino {})", entry.path, entry.ino);
    let what = match entry.kind {
        FileKind::Directory => "Directory",
        FileKind::RegularFile => "File",
    };
    Ok(Json(MessageReply {
        message: format!("{} {} removed", what, entry.path),
    }))
}

pub async fn open(
    State(state): State<AppState>,
    body: Result<Json<OpenRequest>, JsonRejection>,
) -> ApiResult<Json<OpenReply>> {
    let Json(req) = body?;
    let path = req.path.unwrap_or_default();
    let flags = req.flags.unwrap_or(0);
    debug!("open(path={:?}, flags={:#x})", path, flags);
    let fh = state
        .store
        .open_handle(&path, flags)
        .inspect_err(|e| debug!("open: {}", e))?;
    debug!("open: {} -> fh {}", path, fh);
    Ok(Json(OpenReply {
        file_handle: fh,
        flags,
        path,
    }))
}
