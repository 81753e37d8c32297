pub mod room_name;
