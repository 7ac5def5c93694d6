pub mod add_person_cmd;
pub mod remove_person_cmd;
pub mod update_person_cmd;
