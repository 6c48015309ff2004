//! Shared helpers for tests that touch process-global state.
//!
//! PATH and the working directory are process-wide, so every test that
//! fakes a host tool or runs a step that changes directory must hold
//! [`env_lock`] for its whole body.

use std::ffi::OsString;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread;

/// Serializes tests that mutate PATH or the working directory.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    match LOCK.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        // A panicking test poisons the lock; the () state cannot be stale.
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Prepends `dir` to PATH and restores the old value on drop.
pub(crate) struct PathGuard {
    old: OsString,
}

impl PathGuard {
    pub(crate) fn prepend(dir: &Path) -> Self {
        let old = std::env::var_os("PATH").unwrap_or_default();
        let mut parts = vec![dir.to_path_buf()];
        parts.extend(std::env::split_paths(&old));
        let joined = std::env::join_paths(parts).expect("joinable PATH");
        std::env::set_var("PATH", &joined);
        Self { old }
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        std::env::set_var("PATH", &self.old);
    }
}

/// Writes an executable shell script, for faking host tools like `make`.
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Builds a `.tar.gz` whose top-level directory is `dir_name`, containing
/// the given `(relative path, contents, mode)` entries.
pub(crate) fn write_tar_gz(dest: &Path, dir_name: &str, files: &[(&str, &str, u32)]) {
    let out = fs::File::create(dest).expect("create tarball");
    let encoder = flate2::write::GzEncoder::new(out, flate2::Compression::default());
    let encoder = append_tree(encoder, dir_name, files);
    encoder.finish().expect("finish gzip");
}

/// Same tree, zstd-compressed.
pub(crate) fn write_tar_zst(dest: &Path, dir_name: &str, files: &[(&str, &str, u32)]) {
    let out = fs::File::create(dest).expect("create tarball");
    let encoder = zstd::stream::Encoder::new(out, 3).expect("zstd encoder");
    let encoder = append_tree(encoder, dir_name, files);
    encoder.finish().expect("finish zstd");
}

/// Same tree, uncompressed.
pub(crate) fn write_tar(dest: &Path, dir_name: &str, files: &[(&str, &str, u32)]) {
    let out = fs::File::create(dest).expect("create tarball");
    append_tree(out, dir_name, files);
}

fn append_tree<W: Write>(out: W, dir_name: &str, files: &[(&str, &str, u32)]) -> W {
    let mut builder = tar::Builder::new(out);

    let mut dir_header = tar::Header::new_gnu();
    dir_header.set_entry_type(tar::EntryType::Directory);
    dir_header.set_size(0);
    dir_header.set_mode(0o755);
    dir_header.set_cksum();
    builder
        .append_data(&mut dir_header, format!("{}/", dir_name), std::io::empty())
        .expect("append dir entry");

    for (rel, contents, mode) in files {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("{}/{}", dir_name, rel),
                contents.as_bytes(),
            )
            .expect("append file entry");
    }

    builder.into_inner().expect("finish tar")
}

/// A buildable source tree: a `configure` script that records its
/// arguments plus a no-op `Makefile`. The scripts are spawned directly,
/// not through a shell, so they carry a shebang. The real work in
/// build/install tests happens in a faked `make` on PATH.
const SOURCE_TREE: &[(&str, &str, u32)] = &[
    (
        "configure",
        "#!/bin/sh\necho \"$@\" > configure-args\necho run >> configure-log",
        0o755,
    ),
    ("Makefile", "all:\n\ttrue", 0o644),
];

pub(crate) fn write_source_tar_gz(dest: &Path, dir_name: &str) {
    write_tar_gz(dest, dir_name, SOURCE_TREE);
}

pub(crate) fn write_source_tar_zst(dest: &Path, dir_name: &str) {
    write_tar_zst(dest, dir_name, SOURCE_TREE);
}

pub(crate) fn write_source_tar(dest: &Path, dir_name: &str) {
    write_tar(dest, dir_name, SOURCE_TREE);
}

/// One-shot HTTP server for download tests.
///
/// Serves `body` with the given status for every request and counts hits.
/// The accept thread dies with the test process.
pub(crate) fn serve_with_status(status: u16, body: Vec<u8>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("server addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            counter.fetch_add(1, Ordering::SeqCst);

            // Drain the request head before answering.
            let mut req = Vec::new();
            let mut buf = [0u8; 512];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        req.extend_from_slice(&buf[..n]);
                        if req.windows(4).any(|w| w == b"\r\n\r\n") || req.len() > 8192 {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }

            let reason = if status == 200 { "OK" } else { "Error" };
            let head = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                reason,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
        }
    });

    (format!("http://{}/archive.tar.gz", addr), hits)
}

pub(crate) fn serve_bytes(body: Vec<u8>) -> (String, Arc<AtomicUsize>) {
    serve_with_status(200, body)
}

/// Lowercase hex sha256 of in-memory bytes, for fixture specs.
pub(crate) fn digest_of(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    format!("{:x}", Sha256::digest(bytes))
}
