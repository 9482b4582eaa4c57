use actix_web::web;
use serde::Deserialize;

use crate::domain::given_name::GivenName;
use crate::domain::subscriber_email::SubscriberEmail;

pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub given_name: GivenName,
}

#[derive(Deserialize)]
pub struct NewSubscriberBody {
    pub email: String,
    pub given_name: String,
}

impl TryFrom<web::Json<NewSubscriberBody>> for NewSubscriber {
    type Error = String;

    fn try_from(body: web::Json<NewSubscriberBody>) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(body.email.clone())?;
        let given_name = GivenName::parse(body.given_name.clone())?;

        Ok(NewSubscriber { email, given_name })
    }
}
