//! Wire representations of groups and members.
//!
//! Requests carry only caller-owned fields. Responses tolerate missing or
//! null fields (left at their zero value) and ignore unknown ones such as
//! `object`.

use orgsync_domain::{CollectionAccess, DomainError, Group, Member, MemberStatus, MemberType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupRequest<'a> {
    name: &'a str,
    external_id: &'a str,
    access_all: bool,
}

impl<'a> From<&'a Group> for GroupRequest<'a> {
    fn from(group: &'a Group) -> Self {
        Self {
            name: &group.name,
            external_id: &group.external_id,
            access_all: group.access_all,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    access_all: Option<bool>,
}

impl From<GroupResponse> for Group {
    fn from(response: GroupResponse) -> Self {
        Self {
            id: response.id.filter(|id| !id.is_empty()),
            name: response.name.unwrap_or_default(),
            external_id: response.external_id.unwrap_or_default(),
            access_all: response.access_all.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MemberRequest<'a> {
    #[serde(rename = "type")]
    member_type: MemberType,
    access_all: bool,
    external_id: &'a str,
    email: &'a str,
    reset_password_enrolled: bool,
    collections: &'a [CollectionAccess],
}

impl<'a> MemberRequest<'a> {
    /// The create payload. Collections are always sent empty because the
    /// endpoint rejects a null array and collection assignment is not
    /// supported on create.
    pub(crate) fn for_create(member: &'a Member) -> Self {
        Self {
            collections: &[],
            ..Self::for_update(member)
        }
    }

    /// The update payload: every caller-owned field, in full.
    pub(crate) fn for_update(member: &'a Member) -> Self {
        Self {
            member_type: member.member_type,
            access_all: member.access_all,
            external_id: &member.external_id,
            email: &member.email,
            reset_password_enrolled: member.reset_password_enrolled,
            collections: &member.collections,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MemberResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    member_type: Option<i64>,
    #[serde(default)]
    access_all: Option<bool>,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    reset_password_enrolled: Option<bool>,
    #[serde(default)]
    collections: Option<Vec<CollectionAccess>>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<i64>,
}

impl TryFrom<MemberResponse> for Member {
    type Error = DomainError;

    fn try_from(response: MemberResponse) -> Result<Self, DomainError> {
        Ok(Self {
            id: response.id.filter(|id| !id.is_empty()),
            member_type: MemberType::try_from(response.member_type.unwrap_or_default())?,
            access_all: response.access_all.unwrap_or_default(),
            external_id: response.external_id.unwrap_or_default(),
            email: response.email.unwrap_or_default(),
            reset_password_enrolled: response.reset_password_enrolled.unwrap_or_default(),
            collections: response.collections.unwrap_or_default(),
            name: Some(response.name.unwrap_or_default()),
            status: Some(MemberStatus::try_from(response.status.unwrap_or_default())?),
        })
    }
}
