fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::compile_protos("proto/backup_agent/backup_agent.proto")?;
    Ok(())
}
