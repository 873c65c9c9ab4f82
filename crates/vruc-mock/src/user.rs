//! The canned VRUC account served by the user and profile endpoints

use serde::{Deserialize, Serialize};

/// Full user record, as returned by `/apis/oauth2/v1/profile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakeUser {
    pub uid: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub gender: String,
    pub phone: String,
    pub avatar: String,
    pub birthday: String,
    pub profiles: Vec<Profile>,
}

/// One institutional affiliation of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    /// School code, e.g. "bfsu"
    pub code: String,
    pub schoolname: String,
    pub departmenttype: String,
    pub departmentname: String,
    pub departmentid: String,
    pub roletype: String,
    pub rolename: String,
    /// Student number
    pub stno: String,
    pub isprimary: bool,
}

/// Subset returned by `/apis/oauth2/v1/user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub uid: String,
    pub name: String,
    pub username: String,
}

impl FakeUser {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            uid: self.uid.clone(),
            name: self.name.clone(),
            username: self.username.clone(),
        }
    }
}

impl Default for FakeUser {
    fn default() -> Self {
        Self {
            uid: "1085379".to_string(),
            name: "张三".to_string(),
            username: "590a8272aeb84410e6709ce7".to_string(),
            email: "zhangsan@vruc.edu.cn".to_string(),
            gender: "male".to_string(),
            phone: "+8615201458657".to_string(),
            avatar: "http://10.21.5.93/data/logo/200_1085379_0.jpg".to_string(),
            birthday: "1989-10-05".to_string(),
            profiles: vec![Profile {
                id: "490997".to_string(),
                code: "bfsu".to_string(),
                schoolname: "中国人民大学".to_string(),
                departmenttype: "其他".to_string(),
                departmentname: "校医院".to_string(),
                departmentid: "3911".to_string(),
                roletype: "学生".to_string(),
                rolename: "本科生".to_string(),
                stno: "20150119".to_string(),
                isprimary: true,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_fields() {
        let user = FakeUser::default();
        let summary = user.summary();
        assert_eq!(summary.uid, "1085379");
        assert_eq!(summary.name, "张三");
        assert_eq!(summary.username, "590a8272aeb84410e6709ce7");
    }

    #[test]
    fn test_serializes_flat_profile_fields() {
        let json = serde_json::to_value(FakeUser::default()).unwrap();
        assert_eq!(json["profiles"].as_array().unwrap().len(), 1);
        assert_eq!(json["profiles"][0]["code"], "bfsu");
        assert_eq!(json["profiles"][0]["isprimary"], true);
        assert_eq!(json["birthday"], "1989-10-05");
    }
}
