pub mod event;

/// Redis に保存する不透明なアクセストークン
pub struct AccessToken(pub String);
