// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LinkedIn UGC post and asset upload payloads.

use serde::{Deserialize, Serialize};

const SHARE_CONTENT: &str = "com.linkedin.ugc.ShareContent";
const MEMBER_VISIBILITY: &str = "com.linkedin.ugc.MemberNetworkVisibility";
const FEEDSHARE_IMAGE: &str = "urn:li:digitalmediaRecipe:feedshare-image";

pub fn person_urn(author_id: &str) -> String {
    format!("urn:li:person:{author_id}")
}

/// Body of `POST /v2/ugcPosts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcPost {
    pub author: String,
    pub lifecycle_state: &'static str,
    pub specific_content: SpecificContent,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    pub share_content: ShareContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareContent {
    pub share_commentary: ShareCommentary,
    pub share_media_category: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<ShareMedia>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareCommentary {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareMedia {
    pub status: &'static str,
    pub media: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    pub member_network: &'static str,
}

impl UgcPost {
    /// A public post, with an image when `asset` is set.
    pub fn new(author_urn: String, text: String, asset: Option<String>) -> Self {
        let (category, media) = match asset {
            Some(asset) => (
                "IMAGE",
                vec![ShareMedia {
                    status: "READY",
                    media: asset,
                }],
            ),
            None => ("NONE", Vec::new()),
        };
        Self {
            author: author_urn,
            lifecycle_state: "PUBLISHED",
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: ShareCommentary { text },
                    share_media_category: category,
                    media,
                },
            },
            visibility: Visibility {
                member_network: "PUBLIC",
            },
        }
    }
}

/// Body of `POST /v2/assets?action=registerUpload`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUploadRequest {
    pub register_upload_request: RegisterUpload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUpload {
    pub recipes: Vec<&'static str>,
    pub owner: String,
    pub service_relationships: Vec<ServiceRelationship>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRelationship {
    pub relationship_type: &'static str,
    pub identifier: &'static str,
}

impl RegisterUploadRequest {
    pub fn image(owner_urn: String) -> Self {
        Self {
            register_upload_request: RegisterUpload {
                recipes: vec![FEEDSHARE_IMAGE],
                owner: owner_urn,
                service_relationships: vec![ServiceRelationship {
                    relationship_type: "OWNER",
                    identifier: "urn:li:userGeneratedContent",
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUploadResponse {
    pub value: RegisterUploadValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUploadValue {
    pub asset: String,
    pub upload_mechanism: UploadMechanism,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadMechanism {
    #[serde(rename = "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest")]
    pub http_request: MediaUploadHttpRequest,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUploadHttpRequest {
    pub upload_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_post_shape() {
        let post = UgcPost::new(person_urn("abc"), "Hello".into(), None);
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["author"], "urn:li:person:abc");
        assert_eq!(json["lifecycleState"], "PUBLISHED");
        let share = &json["specificContent"][SHARE_CONTENT];
        assert_eq!(share["shareCommentary"]["text"], "Hello");
        assert_eq!(share["shareMediaCategory"], "NONE");
        assert!(share.get("media").is_none());
        assert_eq!(json["visibility"][MEMBER_VISIBILITY], "PUBLIC");
    }

    #[test]
    fn image_post_references_asset() {
        let post = UgcPost::new(person_urn("abc"), "Hi".into(), Some("urn:li:digitalmediaAsset:1".into()));
        let json = serde_json::to_value(&post).unwrap();
        let share = &json["specificContent"][SHARE_CONTENT];
        assert_eq!(share["shareMediaCategory"], "IMAGE");
        assert_eq!(share["media"][0]["media"], "urn:li:digitalmediaAsset:1");
        assert_eq!(share["media"][0]["status"], "READY");
    }

    #[test]
    fn register_upload_response_parses() {
        let body = serde_json::json!({
            "value": {
                "asset": "urn:li:digitalmediaAsset:C5",
                "uploadMechanism": {
                    "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest": {
                        "uploadUrl": "https://upload.example/abc",
                        "headers": {}
                    }
                }
            }
        });
        let parsed: RegisterUploadResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.value.asset, "urn:li:digitalmediaAsset:C5");
        assert_eq!(
            parsed.value.upload_mechanism.http_request.upload_url,
            "https://upload.example/abc"
        );
    }
}
