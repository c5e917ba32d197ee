pub(crate) mod channels;
pub(crate) mod home;
pub(crate) mod items;
pub(crate) mod new_entry;
