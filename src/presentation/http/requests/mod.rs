use std::collections::HashMap;

use poem_openapi::Object;

use crate::domain::value_objects::Recipient;

#[derive(Object, Debug, Clone)]
pub struct RecipientDto {
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<RecipientDto> for Recipient {
    fn from(value: RecipientDto) -> Self {
        Recipient {
            phone: value.phone,
            name: value.name,
            email: value.email,
        }
    }
}

#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct SendSmsRequestDto {
    pub phone: String,
    pub message: String,
    pub variables: Option<HashMap<String, String>>,
}

#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct BulkSendRequestDto {
    pub recipients: Vec<RecipientDto>,
    pub message: Option<String>,
    pub template: Option<String>,
    pub variables: Option<HashMap<String, String>>,
    pub schedule_date: Option<String>,
    pub schedule_time: Option<String>,
}
