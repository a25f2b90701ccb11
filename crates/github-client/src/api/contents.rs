use super::{body, push_opt};
use crate::client::{GitHubClient, Query};
use crate::content::{decode_base64_content, encode_text};
use crate::error::Result;
use crate::models::{Contents, FileCommit, decode};
use crate::path::ApiPath;
use serde::Serialize;

/// Body of a contents API create/update.
///
/// `content` is plain text; it is base64-encoded on the wire. `sha` is required by GitHub when
/// updating an existing file and must be `None` when creating one.
#[derive(Debug, Clone)]
pub struct FileWrite {
    pub message: String,
    pub content: String,
    pub sha: Option<String>,
    pub branch: Option<String>,
}

#[derive(Serialize)]
struct FileWriteBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Serialize)]
struct FileDeleteBody<'a> {
    message: &'a str,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

fn contents_endpoint(owner: &str, repo: &str, path: &str) -> Result<ApiPath> {
    ApiPath::repo(owner, repo)?.seg("contents").tail(path)
}

impl GitHubClient {
    /// Fetch a file (base64 content decoded to text when possible) or a directory listing.
    pub async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Contents> {
        let mut q = Query::new();
        push_opt(&mut q, "ref", git_ref);
        let mut raw = self.get(contents_endpoint(owner, repo, path)?, &q).await?;

        if raw.is_array() {
            return Ok(Contents::Directory(decode(raw)?));
        }
        decode_base64_content(&mut raw);
        Ok(Contents::File(decode(raw)?))
    }

    /// Create (`sha == None`) or update a file.
    pub async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        write: &FileWrite,
    ) -> Result<FileCommit> {
        let payload = FileWriteBody {
            message: &write.message,
            content: encode_text(&write.content),
            sha: write.sha.as_deref(),
            branch: write.branch.as_deref(),
        };
        decode(
            self.put(contents_endpoint(owner, repo, path)?, &body(&payload)?)
                .await?,
        )
    }

    pub async fn delete_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        message: &str,
        sha: &str,
        branch: Option<&str>,
    ) -> Result<FileCommit> {
        let payload = FileDeleteBody {
            message,
            sha,
            branch,
        };
        decode(
            self.delete(contents_endpoint(owner, repo, path)?, Some(&body(&payload)?))
                .await?,
        )
    }
}
