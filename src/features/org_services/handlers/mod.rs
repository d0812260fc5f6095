pub mod org_service_handler;

pub use org_service_handler::{
    __path_create_service, __path_delete_service, __path_destroy_service_group,
    __path_get_my_service, __path_get_service, __path_list_services, __path_update_service,
    create_service, delete_service, destroy_service_group, get_my_service, get_service,
    list_services, update_service,
};
