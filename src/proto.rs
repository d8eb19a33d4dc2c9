tonic::include_proto!("backup_agent");
